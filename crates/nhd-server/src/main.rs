//! # NHD Server
//!
//! Entry point for the report backend.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags and initialize logging
//! 2. Load configuration (defaults → `NHD_*` env → flags)
//! 3. Create the in-memory store and seed users for configured static tokens
//! 4. Create the publisher and identity adapters
//! 5. Serve HTTP until Ctrl+C, then drain in-flight requests

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nhd_gateway::{GatewayService, InMemoryPublisher, StaticTokenVerifier};
use nhd_store::{Datastore, MemStore};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{load_config, Args};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(true).with_thread_ids(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;

    let store = Arc::new(MemStore::new());
    for token in &config.static_tokens {
        store
            .create_user(token.user())
            .await
            .with_context(|| format!("seeding user {}", token.uid))?;
        info!(uid = %token.uid, is_admin = token.is_admin, "Seeded user for static token");
    }
    if config.static_tokens.is_empty() {
        warn!("NHD_STATIC_TOKENS is empty; authenticated routes will reject every request");
    }

    let publisher = Arc::new(InMemoryPublisher::with_capacity(
        config.gateway.publisher.channel_capacity,
    ));
    let identity = Arc::new(StaticTokenVerifier::new(config.static_tokens));

    let service = GatewayService::new(config.gateway, store, publisher, identity)
        .context("failed to create gateway")?;

    info!("===========================================");
    info!("  NHD Report Backend v{}", nhd_gateway::VERSION);
    info!("===========================================");

    service
        .run(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    info!("Shutdown complete");
    Ok(())
}
