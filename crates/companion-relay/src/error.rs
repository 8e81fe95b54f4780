use thiserror::Error;

/// Status used for requests abandoned before the provider answered
pub const STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

/// Everything that can go wrong while relaying one chat message
#[derive(Debug, Error)]
pub enum RelayError {
    /// Bad or missing input; the caller can fix it
    #[error("Message is required")]
    Validation { details: Option<String> },

    /// The server has no provider credential
    #[error("Missing GEMINI_API_KEY on server")]
    Configuration,

    /// The provider answered with a non-success status
    #[error("Gemini API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// The call was abandoned before the provider answered
    #[error("Request aborted")]
    Cancelled,

    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RelayError {
    pub fn validation() -> Self {
        RelayError::Validation { details: None }
    }

    /// HTTP status this error maps to at the request boundary
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::Validation { .. } => 400,
            RelayError::Configuration => 500,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Cancelled => STATUS_CLIENT_CLOSED_REQUEST,
            RelayError::Transport(_) | RelayError::Decode(_) => 500,
        }
    }

    /// Short public message for the `error` field of the response body
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::Validation { .. } => "Message is required",
            RelayError::Configuration => "Missing GEMINI_API_KEY on server",
            RelayError::Upstream { .. } => "Gemini API error",
            RelayError::Cancelled => "Request aborted",
            RelayError::Transport(_) | RelayError::Decode(_) => "Server error",
        }
    }

    /// Optional `details` field of the response body
    pub fn details(&self) -> Option<String> {
        match self {
            RelayError::Validation { details } => details.clone(),
            RelayError::Configuration | RelayError::Cancelled => None,
            RelayError::Upstream { body, .. } => Some(body.clone()),
            RelayError::Transport(e) => Some(e.to_string()),
            RelayError::Decode(e) => Some(e.to_string()),
        }
    }

    /// Catch-all failures that are not the caller's or the provider's fault
    pub fn is_unexpected(&self) -> bool {
        matches!(self, RelayError::Transport(_) | RelayError::Decode(_))
    }
}
