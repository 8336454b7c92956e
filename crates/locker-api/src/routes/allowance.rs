//! Allowance gate endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use locker::{decode_amount, encode_amount_or_zero, needs_approval};
use locker_core::{constants::TOKEN_DECIMALS, Address, Amount, LockError, TokenSymbol};

use crate::dto::{lock_failure, AllowanceQuery, AllowanceResponse, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_allowance))
        .route("/:symbol/refresh", post(refresh_allowance))
}

fn token_address(state: &AppState, symbol: &str) -> Result<Address, LockError> {
    state
        .config()
        .tokens
        .address_of(symbol)
        .ok_or_else(|| LockError::UnknownToken {
            symbol: symbol.to_string(),
        })
}

fn verdict(symbol: &str, token: Address, allowance: Option<Amount>, amount: Amount) -> AllowanceResponse {
    AllowanceResponse {
        symbol: TokenSymbol::new(symbol),
        token,
        allowance: allowance.map(|a| a.to_string()),
        allowance_display: allowance.map(|a| decode_amount(a, TOKEN_DECIMALS)),
        amount: amount.to_string(),
        needs_approval: needs_approval(allowance, amount),
    }
}

/// GET /allowance/{symbol}?amount= - Cached allowance and approval verdict
pub async fn get_allowance(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AllowanceQuery>,
) -> ApiResult<AllowanceResponse> {
    let token = token_address(&state, &symbol).map_err(lock_failure)?;
    let amount = encode_amount_or_zero(query.amount.as_deref().unwrap_or(""), TOKEN_DECIMALS)
        .map_err(lock_failure)?;

    let allowance = state.controller().snapshot().await.allowance(&token);
    Ok(Json(verdict(&symbol, token, allowance, amount)))
}

/// POST /allowance/{symbol}/refresh - Re-read the allowance from the token
pub async fn refresh_allowance(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AllowanceQuery>,
) -> ApiResult<AllowanceResponse> {
    let token = token_address(&state, &symbol).map_err(lock_failure)?;
    let amount = encode_amount_or_zero(query.amount.as_deref().unwrap_or(""), TOKEN_DECIMALS)
        .map_err(lock_failure)?;

    let allowance = state
        .controller()
        .refresh_allowance(&symbol)
        .await
        .map_err(lock_failure)?;
    Ok(Json(verdict(&symbol, token, allowance, amount)))
}
