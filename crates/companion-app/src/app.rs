use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;

use companion_relay::RelayConfig;

use crate::cli::Cli;
use crate::web::server::{WebServer, WebServerConfig};

/// Turn CLI flags (already merged with the environment) into server config
pub fn setup_from_cli(cli: &Cli) -> Result<WebServerConfig> {
    let bind_addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", cli.bind, cli.port))?;

    let relay = RelayConfig {
        api_key: cli.api_key.clone().filter(|key| !key.trim().is_empty()),
        api_url: cli.api_url.clone(),
        default_model: cli.model.clone(),
    };

    let web_dir = if cli.no_static {
        None
    } else {
        Some(cli.web_dir.clone())
    };

    Ok(WebServerConfig {
        bind_addr,
        relay,
        web_dir,
    })
}

/// Run the web server until Ctrl-C / SIGTERM
pub async fn run_web_server(cli: &Cli) -> Result<()> {
    let config = setup_from_cli(cli)?;

    println!("{}", "🌐 Starting AI Companion server...".bright_cyan().bold());
    println!("   Address: {}", config.bind_addr);
    println!("   Default model: {}", config.relay.default_model);
    if config.relay.api_key.is_some() {
        println!("   API key: {}", "configured".green());
    } else {
        println!(
            "   API key: {}",
            "missing - set GEMINI_API_KEY, chat requests will fail".bright_yellow()
        );
    }

    let server = WebServer::new(config);
    server.start().await?;

    println!("{}", "Server stopped.".bright_cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_setup_builds_bind_addr() {
        let cli = Cli::try_parse_from(["companion", "--bind", "127.0.0.1", "--port", "4000"]).unwrap();
        let config = setup_from_cli(&cli).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_setup_rejects_bad_bind() {
        let cli = Cli::try_parse_from(["companion", "--bind", "not an ip"]).unwrap();
        assert!(setup_from_cli(&cli).is_err());
    }

    #[test]
    fn test_setup_blank_key_is_missing() {
        let cli = Cli::try_parse_from(["companion", "--api-key", "   "]).unwrap();
        assert!(setup_from_cli(&cli).unwrap().relay.api_key.is_none());
    }

    #[test]
    fn test_setup_no_static() {
        let cli = Cli::try_parse_from(["companion", "--no-static"]).unwrap();
        assert!(setup_from_cli(&cli).unwrap().web_dir.is_none());
    }
}
