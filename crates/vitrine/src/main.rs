//! vitrine - deploy checks and vitals reporting for the portfolio site

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "vitrine",
    version,
    about = "Deploy-time cache checks and web vitals reporting",
    long_about = "Operational companion to the vitrine runtime core.\n\
                  \n\
                  Verifies that a deployed site can complete the cache install phase\n\
                  (every manifest asset reachable and healthy), and scores or forwards\n\
                  web vitals records captured in the field.\n\
                  \n\
                  Examples:\n\
                    vitrine check --base-url https://example.com     # Verify cache manifest\n\
                    vitrine score metrics.json                       # Score a vitals record\n\
                    vitrine score metrics.json --json                # Machine-readable output\n\
                    vitrine send metrics.json --endpoint https://analytics.example.com/v1\n\
                  \n\
                  Environment Variables:\n\
                    VITRINE_BASE_URL                 # Default origin for 'check'\n\
                    RUST_LOG                         # Log filter (default: info)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify every manifest asset against a deployed origin
    Check {
        /// Origin to check (e.g. https://example.com)
        #[arg(long, env = "VITRINE_BASE_URL")]
        base_url: String,
        /// Cache version identifier to install under
        #[arg(long)]
        version: Option<String>,
    },
    /// Score a web vitals record (JSON file, '-' for stdin)
    Score {
        /// Path to the metrics record
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a web vitals record to an analytics endpoint
    Send {
        /// Path to the metrics record
        path: PathBuf,
        /// Analytics endpoint URL
        #[arg(long)]
        endpoint: String,
        /// Page URL to report as the record's origin
        #[arg(long, default_value = "/")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check { base_url, version } => cli::run_check(&base_url, version).await,
        Command::Score { path, json } => cli::run_score(&path, json),
        Command::Send {
            path,
            endpoint,
            url,
        } => cli::run_send(&path, endpoint, url).await,
    }
}
