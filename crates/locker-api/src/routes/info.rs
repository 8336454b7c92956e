//! Service health, static configuration and chain status endpoints

use axum::{extract::State, Json};
use locker::DURATION_PRESETS;
use locker_core::constants::TOKEN_DECIMALS;

use crate::dto::{ChainResponse, DurationPresetDto, HealthResponse, TokenDto, TokensResponse};
use crate::AppState;

/// GET /health - Liveness plus the deployment this instance serves
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain_id: config.chain_id,
        escrow: config.escrow,
        wallet_connected: state.session().state().await.is_some(),
        call_in_flight: state.controller().is_busy(),
    })
}

/// GET /tokens - Supported tokens, decimals and duration presets
pub async fn list_tokens(State(state): State<AppState>) -> Json<TokensResponse> {
    let config = state.config();
    Json(TokensResponse {
        tokens: config
            .tokens
            .entries()
            .iter()
            .map(|entry| TokenDto {
                symbol: entry.symbol.clone(),
                address: entry.address,
            })
            .collect(),
        default_token: config.default_token.clone(),
        decimals: TOKEN_DECIMALS,
        duration_presets: DURATION_PRESETS
            .iter()
            .map(|(label, days)| DurationPresetDto {
                label: label.to_string(),
                days: *days,
            })
            .collect(),
        escrow: config.escrow,
    })
}

/// GET /chain - Probe the RPC endpoint
pub async fn chain_status(State(state): State<AppState>) -> Json<ChainResponse> {
    let status = state.chain_status().await;
    let config = state.config();
    Json(ChainResponse {
        rpc_url: config.gateway.rpc_url.clone(),
        expected_chain_id: config.chain_id,
        status,
    })
}
