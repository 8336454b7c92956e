//! Wallet session endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use locker_core::Address;

use crate::dto::{ApiError, ApiResult, WalletConnectRequest, WalletStatusResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_status))
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
}

/// GET /wallet - Connected account, if any
pub async fn get_status(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    let wallet = state.session().state().await;
    Json(WalletStatusResponse {
        connected: wallet.is_some(),
        address: wallet.map(|w| w.address),
    })
}

/// POST /wallet/connect - Bind the session to an account and load its locks
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<WalletConnectRequest>,
) -> ApiResult<WalletStatusResponse> {
    let address: Address = request.address.parse().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("invalid_address", format!("{}", e))),
        )
    })?;

    state.session().connect(address).await;
    if let Err(e) = state.controller().refresh().await {
        // The session stays connected; the view catches up on the next refresh
        tracing::warn!(account = %address, error = %e, "Initial lock read failed");
    }

    Ok(get_status(State(state)).await)
}

/// POST /wallet/disconnect - Drop the session and the cached view
pub async fn disconnect(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    state.session().disconnect().await;
    state.controller().clear().await;
    get_status(State(state)).await
}
