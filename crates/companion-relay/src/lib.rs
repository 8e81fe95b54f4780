//! # companion-relay
//!
//! Request/response bridge between the companion chat API and Google's
//! Gemini `generateContent` endpoint.
//!
//! The relay is stateless: every call carries its own history. It validates
//! the incoming message, reshapes prior turns into the provider's two-role
//! vocabulary, calls the provider once, and extracts the reply text.
//!
//! ## Example
//!
//! ```rust,no_run
//! use companion_relay::{ChatRelay, RelayConfig};
//! use companion_types::{ChatRequest, Turn};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), companion_relay::RelayError> {
//!     let relay = ChatRelay::from_config(RelayConfig {
//!         api_key: Some("your-api-key".to_string()),
//!         ..Default::default()
//!     });
//!
//!     let request = ChatRequest::new("And in French?", vec![
//!         Turn::user("Say hello"),
//!         Turn::assistant("Hello!"),
//!     ]);
//!     let reply = relay.chat(request, &CancellationToken::new()).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gemini;
pub mod relay;

pub use error::{RelayError, STATUS_CLIENT_CLOSED_REQUEST};
pub use gemini::{
    Content, ContentRole, GeminiClient, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, GenerativeClient, Part, GEMINI_API_URL,
};
pub use relay::{build_request, truncate_chars, ChatRelay, RelayConfig};
