//! Mock HTTP server setup for integration tests

use lingo_engine::{Engine, EngineBuilder};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const API_KEY: &str = "test-api-key";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Builder pointed at the mock server, with short retry delays and no jitter.
    pub fn builder(&self) -> EngineBuilder {
        Engine::builder(API_KEY)
            .api_url(format!("{}/", self.base_url))
            .retry_base_delay(0.1)
            .retry_jitter(false)
            .timeout(5.0)
    }

    /// Create a test engine with the mock server as base URL
    pub fn engine(&self) -> Engine {
        self.builder().build().expect("engine builds")
    }

    /// Create a mock for a JSON response on `path`
    pub async fn mock_json_response(&self, path: &str, status: u16, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_header("authorization", format!("Bearer {API_KEY}").as_str())
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock for a localize request whose body contains `request`
    pub async fn mock_localize(&self, request: Value, response: Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", "/i18n")
            .match_header("authorization", format!("Bearer {API_KEY}").as_str())
            .match_body(Matcher::PartialJson(request))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response.to_string())
            .create_async()
            .await
    }

    /// Create a mock for an error response that is expected `hits` times
    pub async fn mock_error_response(&self, path: &str, status: u16, hits: usize) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"mock failure"}"#)
            .expect(hits)
            .create_async()
            .await
    }
}
