//! Token locker service
//!
//! Loads configuration, connects the JSON-RPC gateway, and serves the lock
//! controller over the HTTP API while a background task reports locks that
//! mature.

mod maturity_watcher;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chain_client::{RpcGateway, SharedSession};
use locker_api::{start_server, AppState};
use locker_core::AppConfig;

pub use maturity_watcher::MaturityWatcher;

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();
    Ok(())
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing()?;

    let config = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(
        rpc_url = %config.gateway.rpc_url,
        chain_id = config.chain_id,
        escrow = %config.escrow,
        "Starting token locker"
    );

    let rpc = Arc::new(RpcGateway::new(config.gateway.clone()).context("building RPC client")?);
    let status = rpc.probe(config.chain_id).await;
    if !status.online {
        // Reads and submissions will surface gateway errors until it comes up
        tracing::warn!("RPC endpoint offline at startup");
    } else {
        tracing::info!(block = ?status.block_number, chain_matches = status.chain_matches, "RPC endpoint online");
    }

    let state = AppState::with_rpc(config.clone(), rpc, SharedSession::new());
    maturity_watcher::spawn(
        state.controller().clone(),
        Duration::from_secs(config.maturity_tick_secs.max(1)),
    );

    start_server(state).await.context("API server stopped")?;
    Ok(())
}
