use anyhow::Result;
use clap::Parser;

use companion::{init_logging, run_web_server, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Parse CLI arguments (flags fall back to environment variables)
    let cli = Cli::parse();

    init_logging(cli.verbose);

    run_web_server(&cli).await
}
