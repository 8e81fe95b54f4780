//! Core types shared by the companion server and the browser client
//!
//! This crate compiles for both native targets and `wasm32-unknown-unknown`,
//! so the wire format of `/api/chat` is defined exactly once.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Constants
// ============================================================================

/// Model used when a chat request does not name one
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Per-turn character limit applied when history is forwarded to the provider
pub const MAX_TURN_CHARS: usize = 8000;

/// Local storage key holding the serialized conversation history
pub const HISTORY_STORAGE_KEY: &str = "ai.chat.history";

/// Assistant turn seeded into an empty conversation
pub const WELCOME_MESSAGE: &str =
    "Hi! I'm your AI Companion. Ask me anything — I'll help in a friendly, concise way.";

// ============================================================================
// Conversation Types
// ============================================================================

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Lenient parse: `assistant` and `model` are the assistant, anything
    /// else is the user.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "assistant" | "model" => Role::Assistant,
            _ => Role::User,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = deserialize_string_or_null(deserializer)?;
        Ok(Role::parse_lenient(&raw))
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub text: String,
}

fn default_role() -> Role {
    Role::User
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Helper function to deserialize string or null values
pub fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Deserialize request history leniently.
///
/// A `null` list is empty. Entries that are not objects, or whose `role` is
/// missing or falsy (`null`, `false`, `0`, `""`), are dropped.
pub fn deserialize_history<'de, D>(deserializer: D) -> Result<Vec<Turn>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .iter()
        .filter_map(turn_from_value)
        .collect())
}

fn turn_from_value(value: &serde_json::Value) -> Option<Turn> {
    let role = match value.get("role")? {
        serde_json::Value::String(s) if !s.is_empty() => Role::parse_lenient(s),
        serde_json::Value::Bool(true) => Role::User,
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Role::User,
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Role::User,
        _ => return None,
    };

    let text = match value.get("text") {
        Some(serde_json::Value::String(s)) => s.clone(),
        None | Some(serde_json::Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };

    Some(Turn { role, text })
}

// ============================================================================
// HTTP API Types
// ============================================================================

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_history")]
    pub history: Vec<Turn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            message: Some(message.into()),
            history,
            model: None,
        }
    }
}

/// Successful reply of `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub text: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Reply of `GET /api/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_role_accepts_model_as_assistant() {
        let turn: Turn = serde_json::from_value(json!({"role": "model", "text": "hi"})).unwrap();
        assert_eq!(turn.role, Role::Assistant);
    }

    #[test]
    fn test_unknown_role_maps_to_user() {
        let turn: Turn = serde_json::from_value(json!({"role": "system", "text": "x"})).unwrap();
        assert_eq!(turn.role, Role::User);
    }

    #[test]
    fn test_turn_serializes_canonical_roles() {
        let value = serde_json::to_value(vec![Turn::user("a"), Turn::assistant("b")]).unwrap();
        assert_eq!(
            value,
            json!([{"role": "user", "text": "a"}, {"role": "assistant", "text": "b"}])
        );
    }

    #[test]
    fn test_missing_or_null_text_is_empty() {
        let turns: Vec<Turn> =
            serde_json::from_value(json!([{"role": "user"}, {"role": "user", "text": null}])).unwrap();
        assert!(turns.iter().all(|t| t.text.is_empty()));
    }

    #[test]
    fn test_chat_request_defaults() {
        let req: ChatRequest = serde_json::from_value(json!({"message": "hello"})).unwrap();
        assert_eq!(req.message.as_deref(), Some("hello"));
        assert!(req.history.is_empty());
        assert_eq!(req.model, None);
    }

    #[test]
    fn test_chat_request_drops_unusable_history_entries() {
        let req: ChatRequest = serde_json::from_value(json!({
            "message": "hi",
            "history": [
                null,
                "stray",
                {"text": "orphan"},
                {"role": "", "text": "blank role"},
                {"role": null, "text": "null role"},
                {"role": "assistant", "text": "a"},
                {"role": "user", "text": null}
            ]
        }))
        .unwrap();

        assert_eq!(req.history, vec![Turn::assistant("a"), Turn::user("")]);
    }

    #[test]
    fn test_chat_request_null_history_is_empty() {
        let req: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "history": null})).unwrap();
        assert!(req.history.is_empty());
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ErrorBody {
            error: "Message is required".to_string(),
            details: None,
        };
        assert_eq!(serde_json::to_value(body).unwrap(), json!({"error": "Message is required"}));
    }
}
