//! Data Transfer Objects for API requests and responses

use axum::{http::StatusCode, Json};
use chain_client::ChainStatus;
use locker::LockView;
use locker_core::{Address, ChainId, LockError, TokenSymbol, UnixSeconds};
use serde::{Deserialize, Serialize};

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiError>);

/// Handler result carrying a JSON body
pub type ApiResult<T> = Result<Json<T>, ApiFailure>;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub chain_id: ChainId,
    pub escrow: Address,
    pub wallet_connected: bool,
    pub call_in_flight: bool,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&LockError> for ApiError {
    fn from(err: &LockError) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}

/// Map a lock error to its HTTP status and body
pub fn lock_failure(err: LockError) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_local() {
        tracing::debug!(code = err.error_code(), error = %err, "Request refused");
    } else {
        tracing::warn!(code = err.error_code(), error = %err, "Request failed");
    }
    (status, Json(ApiError::from(&err)))
}

// =============================================================================
// Tokens and chain
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDto {
    pub symbol: TokenSymbol,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationPresetDto {
    pub label: String,
    pub days: u64,
}

/// Static token configuration for the lock form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenDto>,
    pub default_token: TokenSymbol,
    /// Shared by every token
    pub decimals: u32,
    pub duration_presets: Vec<DurationPresetDto>,
    pub escrow: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainResponse {
    pub rpc_url: String,
    pub expected_chain_id: ChainId,
    #[serde(flatten)]
    pub status: ChainStatus,
}

// =============================================================================
// Wallet
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStatusResponse {
    pub connected: bool,
    /// Only populated when `connected` is true
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConnectRequest {
    /// 0x-prefixed account address
    pub address: String,
}

// =============================================================================
// Locks and allowances
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocksResponse {
    pub account: Option<Address>,
    pub locks: Vec<LockView>,
    pub active_count: usize,
    pub refreshed_at: Option<UnixSeconds>,
    pub now: UnixSeconds,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowanceQuery {
    /// Decimal amount the user intends to lock
    #[serde(default)]
    pub amount: Option<String>,
}

/// Cached allowance with the approval verdict for an intended amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub symbol: TokenSymbol,
    pub token: Address,
    /// Smallest-unit integer as a string; `None` until read
    pub allowance: Option<String>,
    pub allowance_display: Option<String>,
    /// Intended amount in smallest units, as a string
    pub amount: String,
    pub needs_approval: bool,
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub token: String,
    /// Decimal amount, e.g. "500" or "12.5"
    pub amount: String,
}
