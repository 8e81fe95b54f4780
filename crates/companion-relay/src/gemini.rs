use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Public Gemini endpoint
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

// ============================================================================
// Request Types
// ============================================================================

/// Role vocabulary of the provider: only `user` and `model` exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: ContentRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    /// Reply text of the first candidate.
    ///
    /// Joins the text of every part; when that is empty, falls back to the
    /// first part alone. No candidate yields an empty string.
    pub fn extract_text(&self) -> String {
        let parts = self
            .candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.as_ref());

        let Some(parts) = parts else {
            return String::new();
        };

        let joined: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if !joined.is_empty() {
            return joined;
        }

        parts
            .first()
            .and_then(|p| p.text.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Client
// ============================================================================

/// Anything that can answer a `generateContent` call
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RelayError>;
}

/// Gemini REST client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn get_generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RelayError> {
        let url = self.get_generate_url(model);
        tracing::debug!(%url, turns = request.contents.len(), "calling provider");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "provider returned an error");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_joins_all_parts() {
        let r = response(json!({
            "candidates": [{"content": {"parts": [{"text": "Hi"}, {"text": " there"}]}}]
        }));
        assert_eq!(r.extract_text(), "Hi there");
    }

    #[test]
    fn test_extract_uses_first_candidate_only() {
        let r = response(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}]}},
                {"content": {"parts": [{"text": "second"}]}}
            ]
        }));
        assert_eq!(r.extract_text(), "first");
    }

    #[test]
    fn test_extract_without_candidates_is_empty() {
        assert_eq!(response(json!({})).extract_text(), "");
        assert_eq!(response(json!({"candidates": []})).extract_text(), "");
        assert_eq!(response(json!({"candidates": [{}]})).extract_text(), "");
    }

    #[test]
    fn test_extract_skips_non_text_parts() {
        let r = response(json!({
            "candidates": [{"content": {"parts": [{"functionCall": {}}, {"text": "ok"}]}}]
        }));
        assert_eq!(r.extract_text(), "ok");
    }

    #[test]
    fn test_request_wire_format() {
        let request = GenerateContentRequest {
            contents: vec![Content::text(ContentRole::Model, "a")],
            generation_config: GenerationConfig::default(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "model", "parts": [{"text": "a"}]}],
                "generationConfig": {
                    "temperature": 0.8,
                    "topP": 0.95,
                    "topK": 40,
                    "maxOutputTokens": 2048
                }
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = GeminiClient::new("k".to_string(), "http://localhost:1/".to_string());
        assert_eq!(
            client.get_generate_url("m"),
            "http://localhost:1/v1beta/models/m:generateContent"
        );
    }
}
