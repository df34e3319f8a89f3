use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::recommender::RecommendError;

/// Errors surfaced by HTTP handlers, each mapped to a status code and a
/// `{error, detail}` JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            ApiError::Internal(err) => {
                error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        let detail = match &self {
            ApiError::Internal(err) => format!("{:#}", err),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": title, "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
