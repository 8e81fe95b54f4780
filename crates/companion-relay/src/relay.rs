use std::sync::Arc;

use companion_types::{ChatRequest, Role, Turn, DEFAULT_MODEL, MAX_TURN_CHARS};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::RelayError;
use crate::gemini::{
    Content, ContentRole, GeminiClient, GenerateContentRequest, GenerationConfig, GenerativeClient,
    GEMINI_API_URL,
};

/// Relay configuration, usually filled from CLI flags and environment
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub default_model: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: GEMINI_API_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Stateless bridge between `/api/chat` and the provider
pub struct ChatRelay {
    client: Option<Arc<dyn GenerativeClient>>,
    default_model: String,
}

impl ChatRelay {
    /// Build a relay talking to Gemini. Without an API key the relay still
    /// starts, but every chat fails with [`RelayError::Configuration`].
    pub fn from_config(config: RelayConfig) -> Self {
        let client = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| Arc::new(GeminiClient::new(key, config.api_url)) as Arc<dyn GenerativeClient>);

        Self {
            client,
            default_model: config.default_model,
        }
    }

    pub fn with_client(client: Arc<dyn GenerativeClient>, default_model: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            default_model: default_model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Fails when no provider credential is available
    pub fn ensure_configured(&self) -> Result<&Arc<dyn GenerativeClient>, RelayError> {
        self.client.as_ref().ok_or(RelayError::Configuration)
    }

    /// Relay one message and return the extracted reply text.
    ///
    /// The credential check comes first, then input validation; only then is
    /// the provider called, exactly once. Firing `cancel` abandons the call.
    pub async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<String, RelayError> {
        let client = self.ensure_configured()?;

        let message = request
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(RelayError::validation)?;

        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.clone());

        let body = build_request(&request.history, &message);
        let span = tracing::info_span!(
            "relay",
            request_id = %Uuid::new_v4(),
            model = %model,
            turns = body.contents.len()
        );

        async {
            let response = tokio::select! {
                result = client.generate_content(&model, &body) => result?,
                _ = cancel.cancelled() => {
                    tracing::info!("relay call cancelled");
                    return Err(RelayError::Cancelled);
                }
            };

            let text = response.extract_text();
            tracing::info!(reply_chars = text.chars().count(), "relay call completed");
            Ok::<_, RelayError>(text)
        }
        .instrument(span)
        .await
    }
}

/// Translate prior turns plus the new message into a provider request.
///
/// Turns with empty text are dropped, assistant turns become `model`, and
/// every history turn is cut to [`MAX_TURN_CHARS`]. The new message is
/// appended last as a `user` entry, untouched.
pub fn build_request(history: &[Turn], message: &str) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .filter(|turn| !turn.text.is_empty())
        .map(|turn| {
            let role = match turn.role {
                Role::Assistant => ContentRole::Model,
                Role::User => ContentRole::User,
            };
            Content::text(role, truncate_chars(&turn.text, MAX_TURN_CHARS))
        })
        .collect();

    contents.push(Content::text(ContentRole::User, message));

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig::default(),
    }
}

/// Keep at most `max_chars` characters, without any suffix
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
