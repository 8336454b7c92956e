//! Lock registry endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use locker::Submission;

use crate::dto::{lock_failure, ApiResult, LocksResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locks))
        .route("/refresh", post(refresh_locks))
        .route("/:index/withdraw", post(withdraw))
}

/// GET /locks - Cached locks evaluated against the current time
pub async fn list_locks(State(state): State<AppState>) -> Json<LocksResponse> {
    let controller = state.controller();
    let snapshot = controller.snapshot().await;
    let now = controller.now();

    Json(LocksResponse {
        account: snapshot.account,
        locks: snapshot.views(controller.tokens(), now, controller.is_busy()),
        active_count: snapshot.active_count(),
        refreshed_at: snapshot.refreshed_at,
        now,
    })
}

/// POST /locks/refresh - Re-read the registry for the connected account
pub async fn refresh_locks(State(state): State<AppState>) -> ApiResult<LocksResponse> {
    state.controller().refresh().await.map_err(lock_failure)?;
    Ok(list_locks(State(state)).await)
}

/// POST /locks/{index}/withdraw - Withdraw a matured lock
pub async fn withdraw(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Submission> {
    tracing::info!(index, "Withdraw requested");
    let submission = state.controller().withdraw(index).await.map_err(lock_failure)?;
    Ok(Json(submission))
}
