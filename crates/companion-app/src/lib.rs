//! AI Companion server
//!
//! Serves the browser client and relays chat messages to Google Gemini.

pub mod app;
pub mod cli;
pub mod logging;
pub mod web;

pub use app::{run_web_server, setup_from_cli};
pub use cli::Cli;
pub use logging::init_logging;
pub use web::{create_router, AppState, WebServer, WebServerConfig};
