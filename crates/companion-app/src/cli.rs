use clap::Parser;
use std::path::PathBuf;

use companion_relay::GEMINI_API_URL;
use companion_types::DEFAULT_MODEL;

/// CLI arguments for the companion server
#[derive(Parser, Debug, Clone)]
#[command(name = "companion")]
#[command(about = "AI Companion - a minimal web chat relay for Google Gemini")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind the HTTP server to
    #[arg(long, env = "COMPANION_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Gemini API key. The server starts without one, but every chat
    /// request then fails with a configuration error.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used when a request does not name one
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Gemini API
    #[arg(long, env = "GEMINI_API_URL", default_value = GEMINI_API_URL)]
    pub api_url: String,

    /// Directory with the browser client (index.html, pkg/)
    #[arg(long, env = "COMPANION_WEB_DIR", default_value = "public")]
    pub web_dir: PathBuf,

    /// Serve the API only, without static files
    #[arg(long)]
    pub no_static: bool,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,
}
