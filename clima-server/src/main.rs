//! Binary entry point for the `clima` HTTP facade.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Initialising tracing
//! - Loading configuration and starting the server

use std::path::PathBuf;

use clap::Parser;
use clima_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clima-server", version, about = "HTTP weather facade")]
struct Cli {
    /// Path to a TOML configuration file. Defaults to the platform config
    /// directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    clima_server::run(config).await
}
