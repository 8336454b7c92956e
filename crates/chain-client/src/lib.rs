//! chain-client: Contract gateway and wallet session seams
//!
//! The lock controller talks to the chain only through [`ContractGateway`]
//! and learns who the user is only through [`WalletSession`]. [`RpcGateway`]
//! implements the gateway over Ethereum JSON-RPC.

pub mod probe;
pub mod rpc;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use locker_core::{Address, GatewayError, TxHash};
use locker_tx::ContractCall;
use serde::{Deserialize, Serialize};

pub use probe::ChainStatus;
pub use rpc::RpcGateway;
pub use session::SharedSession;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Outcome of a submitted call once it is included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finality {
    Success,
    Reverted,
}

/// Read/write access to the token and lock-registry contracts
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Execute a view function and return the raw ABI-encoded result.
    /// `from` scopes caller-relative views such as `getMyLocks`.
    async fn read(&self, from: Option<&Address>, call: &ContractCall) -> Result<Vec<u8>>;

    /// Submit a state-changing call signed by `from`. Returns once the
    /// wallet has accepted it; inclusion is observed via `await_finality`.
    async fn submit(&self, from: &Address, call: &ContractCall) -> Result<TxHash>;

    /// Suspend until the transaction is included
    async fn await_finality(&self, tx_hash: &TxHash) -> Result<Finality>;
}

#[async_trait]
impl<T: ContractGateway + ?Sized> ContractGateway for Arc<T> {
    async fn read(&self, from: Option<&Address>, call: &ContractCall) -> Result<Vec<u8>> {
        (**self).read(from, call).await
    }

    async fn submit(&self, from: &Address, call: &ContractCall) -> Result<TxHash> {
        (**self).submit(from, call).await
    }

    async fn await_finality(&self, tx_hash: &TxHash) -> Result<Finality> {
        (**self).await_finality(tx_hash).await
    }
}

/// Source of the connected account
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The connected account, or `None` when disconnected
    async fn account(&self) -> Option<Address>;
}

#[async_trait]
impl<T: WalletSession + ?Sized> WalletSession for Arc<T> {
    async fn account(&self) -> Option<Address> {
        (**self).account().await
    }
}
