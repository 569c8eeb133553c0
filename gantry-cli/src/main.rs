//! Gantry CLI
//!
//! Command-line interface for the Gantry CI/CD API: pipeline-build
//! lifecycle operations and live node-run watching.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "Gantry CI/CD API CLI", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "GANTRY_API_URL", default_value = "http://localhost:8081")]
    api_url: String,

    /// Session token sent with every request
    #[arg(long, env = "GANTRY_SESSION_TOKEN", default_value = "")]
    session_token: String,

    /// Acting user, forwarded to the live poller
    #[arg(long, env = "GANTRY_USER", default_value = "")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gantry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        session_token: cli.session_token,
        user: cli.user,
    };

    handle_command(cli.command, &config).await
}
