//! `fieldvault-server` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (JSON logs, optional OTLP export).
//! 3. Derive the field key and build the cipher, policy and field registry.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use fieldvault::models::standard_registry;
use fieldvault::{DataProtector, DecryptionPolicy, FieldCipher, FieldSweeper};
use tracing::info;

use crate::config::Config;
use crate::server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        otlp = cfg.otlp_endpoint().is_some(),
        "fieldvault-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Key, cipher, policy, registry
    // -----------------------------------------------------------------------
    let key = cfg.cipher_key()?;
    let protector = DataProtector::new(FieldCipher::new(key), DecryptionPolicy::default());
    let registry = standard_registry();
    info!(kinds = ?registry.kinds(), "field registry loaded");
    let sweeper = FieldSweeper::new(Arc::new(protector), Arc::new(registry));

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        sweeper,
        cfg.caller_header_name.clone(),
        cfg.roles_header_name.clone(),
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
