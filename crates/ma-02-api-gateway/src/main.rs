//! # Mini-App API Gateway
//!
//! Binary entry point.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load configuration from the environment and validate it
//! 3. Load the bot token from `TELEGRAM_BOT_TOKEN` (startup fails without it)
//! 4. Serve until Ctrl+C

use anyhow::{Context, Result};
use ma_02_api_gateway::{load_credential, shutdown_signal, GatewayConfig, GatewayService};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = GatewayConfig::from_env().context("failed to load gateway configuration")?;
    let credential = load_credential(|key| std::env::var(key).ok())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.http_addr(),
        "Mini-app API gateway starting"
    );

    let gateway = GatewayService::new(config, credential)?;
    gateway.run(shutdown_signal()).await?;

    Ok(())
}
