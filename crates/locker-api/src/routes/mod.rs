//! API route handlers

pub mod actions;
pub mod allowance;
pub mod info;
pub mod locks;
pub mod wallet;

use axum::{routing::get, Router};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(info::health_check))
        .route("/tokens", get(info::list_tokens))
        .route("/chain", get(info::chain_status))
        .nest("/wallet", wallet::router())
        .nest("/locks", locks::router())
        .nest("/allowance", allowance::router())
        .merge(actions::router())
        .with_state(state)
}
