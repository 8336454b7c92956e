//! In-process wallet session

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use locker_core::Address;
use tokio::sync::RwLock;

use crate::WalletSession;

/// A connected wallet
#[derive(Clone, Debug)]
pub struct WalletState {
    pub address: Address,
    /// When the wallet was connected
    pub connected_at: Instant,
}

/// Wallet session shared between the API layer and the controller.
///
/// Cloning yields another handle onto the same session.
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    wallet: Arc<RwLock<Option<WalletState>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that starts connected to `address`
    pub fn connected(address: Address) -> Self {
        Self {
            wallet: Arc::new(RwLock::new(Some(WalletState {
                address,
                connected_at: Instant::now(),
            }))),
        }
    }

    pub async fn connect(&self, address: Address) {
        let mut wallet = self.wallet.write().await;
        tracing::info!(account = %address, "Wallet connected");
        *wallet = Some(WalletState {
            address,
            connected_at: Instant::now(),
        });
    }

    pub async fn disconnect(&self) {
        let mut wallet = self.wallet.write().await;
        if wallet.take().is_some() {
            tracing::info!("Wallet disconnected");
        }
    }

    pub async fn state(&self) -> Option<WalletState> {
        self.wallet.read().await.clone()
    }
}

#[async_trait]
impl WalletSession for SharedSession {
    async fn account(&self) -> Option<Address> {
        self.wallet.read().await.as_ref().map(|w| w.address)
    }
}
