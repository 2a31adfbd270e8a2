//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Server Info
    // ========================================================================

    /// GET / - Server stats
    pub async fn get_stats(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Stats request failed")
    }

    /// GET /api/options - Selectable request values
    pub async fn get_options(&self) -> Response {
        self.client
            .get(format!("{}/api/options", self.base_url))
            .send()
            .await
            .expect("Options request failed")
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    /// POST /api/recommend with the three selection fields
    pub async fn recommend(&self, budget: &str, genre: &str, sound_character: &str) -> Response {
        self.recommend_raw(json!({
            "budget": budget,
            "genre": genre,
            "sound_character": sound_character,
        }))
        .await
    }

    /// POST /api/recommend with an explicit result count
    pub async fn recommend_top_n(
        &self,
        budget: &str,
        genre: &str,
        sound_character: &str,
        top_n: usize,
    ) -> Response {
        self.recommend_raw(json!({
            "budget": budget,
            "genre": genre,
            "sound_character": sound_character,
            "top_n": top_n,
        }))
        .await
    }

    /// POST /api/recommend with an arbitrary JSON body
    pub async fn recommend_raw(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/recommend", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Recommend request failed")
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// GET /img?u=<url> - Image relay
    pub async fn relay_image(&self, url: &str) -> Response {
        self.client
            .get(format!("{}/img", self.base_url))
            .query(&[("u", url)])
            .send()
            .await
            .expect("Image relay request failed")
    }

    /// GET /static/<path> - Static assets
    pub async fn get_static(&self, path: &str) -> Response {
        self.client
            .get(format!("{}/static/{}", self.base_url, path))
            .send()
            .await
            .expect("Static asset request failed")
    }
}
