//! Integration tests for EcoStore.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database, run migrations, seed the catalog
//! cargo run -p ecostore-cli -- migrate
//! cargo run -p ecostore-cli -- seed
//!
//! # Start the API server
//! cargo run -p ecostore-api
//!
//! # Run the (ignored-by-default) integration tests
//! cargo test -p ecostore-integration-tests -- --ignored
//! ```
//!
//! The base URL defaults to `http://localhost:5000` and can be overridden
//! with `ECOSTORE_BASE_URL`. Checkout confirmation tests additionally need
//! `STRIPE_API_BASE` pointed at a stripe-mock instance.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// A fresh HTTP client plus the server base URL.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a context pointed at the configured server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("ECOSTORE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());

        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
        }
    }

    /// Full URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register a throwaway account, returning its bearer token and the
    /// response body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response has no token.
    pub async fn register_user(&self) -> (String, Value) {
        let suffix = Uuid::new_v4().simple().to_string();
        let body = json!({
            "username": format!("it-{}", &suffix[..12]),
            "email": format!("it-{suffix}@example.com"),
            "password": "integration-pass-1",
        });

        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await
            .expect("register request failed");

        assert_eq!(resp.status(), 200, "registration should succeed");
        let body: Value = resp.json().await.expect("register response not JSON");
        let token = body["token"]
            .as_str()
            .expect("register response missing token")
            .to_string();

        (token, body)
    }

    /// GET an authenticated JSON endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get_authed(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("request failed")
    }

    /// POST JSON to an authenticated endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_authed(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("request failed")
    }
}
