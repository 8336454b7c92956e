//! Error types for the locker

use thiserror::Error;

/// Top-level errors that can occur in the locker
#[derive(Debug, Error)]
pub enum Error {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures parsing hex-encoded chain identifiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid address: {value}")]
    InvalidAddress { value: String },

    #[error("Invalid transaction hash: {value}")]
    InvalidTxHash { value: String },
}

/// Contract gateway (RPC endpoint) errors
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("RPC endpoint unreachable at {url}")]
    Unreachable { url: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Lock lifecycle errors.
///
/// `InvalidAmount`, `InvalidDuration`, `UnknownToken` and `PreconditionNotMet`
/// are raised before any call is made. `SubmissionRejected` and
/// `FinalityFailure` describe a call that was attempted.
#[derive(Debug, Clone, Error)]
pub enum LockError {
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Invalid duration: {message}")]
    InvalidDuration { message: String },

    #[error("Unknown token: {symbol}")]
    UnknownToken { symbol: String },

    #[error("Action not allowed: {reason}")]
    PreconditionNotMet { reason: String },

    #[error("Wallet not connected")]
    WalletDisconnected,

    #[error("Submission rejected: {message}")]
    SubmissionRejected { message: String },

    #[error("Transaction {tx_hash} failed: {message}")]
    FinalityFailure { tx_hash: String, message: String },

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Result type alias for locker operations
pub type Result<T> = std::result::Result<T, Error>;

impl LockError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            reason: reason.into(),
        }
    }

    /// True for errors that stop an action before any call is made
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::InvalidDuration { .. }
                | Self::UnknownToken { .. }
                | Self::PreconditionNotMet { .. }
                | Self::WalletDisconnected
        )
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::UnknownToken { .. } => "unknown_token",
            Self::PreconditionNotMet { .. } => "precondition_not_met",
            Self::WalletDisconnected => "wallet_disconnected",
            Self::SubmissionRejected { .. } => "submission_rejected",
            Self::FinalityFailure { .. } => "finality_failure",
            Self::Gateway(_) => "gateway_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::InvalidDuration { .. } => 400,
            Self::UnknownToken { .. } => 404,
            Self::PreconditionNotMet { .. } => 409,
            Self::WalletDisconnected => 401,
            Self::SubmissionRejected { .. } | Self::FinalityFailure { .. } => 502,
            Self::Gateway(_) => 503,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_error_codes() {
        let err = LockError::InvalidAmount {
            message: "test".into(),
        };
        assert_eq!(err.error_code(), "invalid_amount");
        assert_eq!(err.status_code(), 400);
        assert!(err.is_local());

        let err = LockError::FinalityFailure {
            tx_hash: "0x00".into(),
            message: "reverted".into(),
        };
        assert_eq!(err.error_code(), "finality_failure");
        assert_eq!(err.status_code(), 502);
        assert!(!err.is_local());
    }

    #[test]
    fn test_gateway_error_wraps_into_lock_error() {
        let err: LockError = GatewayError::Timeout { secs: 30 }.into();
        assert_eq!(err.error_code(), "gateway_error");
        assert_eq!(err.status_code(), 503);
    }
}
