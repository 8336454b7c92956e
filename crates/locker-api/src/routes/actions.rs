//! State-changing actions and the controller state

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use locker::{encode_amount, ActionState, LockForm, Submission};
use locker_core::constants::TOKEN_DECIMALS;

use crate::dto::{lock_failure, ApiResult, ApproveRequest};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/approve", post(approve))
        .route("/lock", post(lock))
        .route("/action", get(get_action))
        .route("/action/abandon", post(abandon))
        .route("/action/reset", post(reset))
}

/// POST /approve - Approve the escrow for exactly the intended amount
pub async fn approve(
    State(state): State<AppState>,
    Json(request): Json<ApproveRequest>,
) -> ApiResult<Submission> {
    let amount = encode_amount(&request.amount, TOKEN_DECIMALS).map_err(lock_failure)?;
    let submission = state
        .controller()
        .approve(&request.token, amount)
        .await
        .map_err(lock_failure)?;
    Ok(Json(submission))
}

/// POST /lock - Validate the lock form and submit `lockTokens`
pub async fn lock(
    State(state): State<AppState>,
    Json(form): Json<LockForm>,
) -> ApiResult<Submission> {
    let submission = state
        .controller()
        .lock_form(&form)
        .await
        .map_err(lock_failure)?;
    Ok(Json(submission))
}

/// GET /action - Current lifecycle state
pub async fn get_action(State(state): State<AppState>) -> Json<ActionState> {
    Json(state.controller().state())
}

/// POST /action/abandon - Stop waiting for the call in flight
pub async fn abandon(State(state): State<AppState>) -> ApiResult<ActionState> {
    let failed = state.controller().abandon().await.map_err(lock_failure)?;
    Ok(Json(failed))
}

/// POST /action/reset - Clear a settled outcome
pub async fn reset(State(state): State<AppState>) -> ApiResult<ActionState> {
    state.controller().reset().await.map_err(lock_failure)?;
    Ok(Json(state.controller().state()))
}
