//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
    /// Metrics/admin listener, needed only by admin calls
    pub admin_url: Option<String>,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            admin_url: None,
        }
    }

    pub fn with_admin_url(mut self, admin_url: String) -> Self {
        self.admin_url = Some(admin_url);
        self
    }

    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    pub async fn get_health(&self) -> Response {
        self.get("/health").await
    }

    /// POST /api/recommend with a full request body
    pub async fn recommend(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/recommend", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Recommend request failed")
    }

    /// POST /api/recommend with just a mood and k
    pub async fn recommend_mood(&self, mood: &str, k: u32) -> Response {
        self.recommend(json!({ "mood": mood, "k": k })).await
    }

    pub async fn get_song(&self, id: i64) -> Response {
        self.get(&format!("/api/song/{}", id)).await
    }

    pub async fn get_genres(&self) -> Response {
        self.get("/api/genres").await
    }

    pub async fn get_moods(&self) -> Response {
        self.get("/api/moods").await
    }

    /// POST /api/encoder/rebuild on the admin listener
    pub async fn rebuild_encoder(&self) -> Response {
        self.client
            .post(format!("{}/api/encoder/rebuild", self.admin_url()))
            .send()
            .await
            .expect("Rebuild request failed")
    }

    pub async fn get_metrics(&self) -> Response {
        self.client
            .get(format!("{}/metrics", self.admin_url()))
            .send()
            .await
            .expect("Metrics request failed")
    }

    fn admin_url(&self) -> &str {
        self.admin_url
            .as_deref()
            .expect("TestClient built without an admin url")
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }
}
