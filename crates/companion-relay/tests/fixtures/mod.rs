use serde_json::json;
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";

/// Mock Gemini server for exercising the relay over real HTTP
pub struct GeminiMockServer {
    server: MockServer,
}

#[allow(dead_code)]
impl GeminiMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Mock a successful reply made of the given text parts
    pub async fn mock_success(&self, model: &str, parts: &[&str]) {
        let parts: Vec<_> = parts.iter().map(|text| json!({ "text": text })).collect();
        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{}:generateContent", model)))
            .and(query_param("key", TEST_API_KEY))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": parts },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a reply without candidates (e.g. blocked by safety filters)
    pub async fn mock_no_candidates(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a provider error with a raw body
    pub async fn mock_error(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a success status with a body that is not JSON
    pub async fn mock_garbage(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request the server received
    pub async fn received_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|req| serde_json::from_slice(&req.body).unwrap_or(serde_json::Value::Null))
            .collect()
    }
}
