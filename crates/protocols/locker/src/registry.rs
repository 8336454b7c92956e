//! Lock registry view
//!
//! Sole owner of the cached lock set and allowances for the active account.
//! Every refresh replaces the cached value wholesale; nothing is patched in
//! place.

use chain_client::ContractGateway;
use locker_core::{Address, Amount, GatewayError};
use tokio::sync::RwLock;

use crate::fetch::{fetch_allowance, fetch_locks};
use crate::maturity::unix_now;
use crate::state::{Lock, RegistrySnapshot};

pub struct LockRegistry {
    escrow: Address,
    cache: RwLock<RegistrySnapshot>,
}

impl LockRegistry {
    pub fn new(escrow: Address) -> Self {
        Self {
            escrow,
            cache: RwLock::new(RegistrySnapshot::default()),
        }
    }

    pub fn escrow(&self) -> Address {
        self.escrow
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.cache.read().await.clone()
    }

    /// Re-read the lock set of `account`.
    ///
    /// With no account nothing is read and the cache is emptied. A failed
    /// read leaves the previous cache in place.
    pub async fn refresh<G: ContractGateway + ?Sized>(
        &self,
        gateway: &G,
        account: Option<Address>,
    ) -> Result<Vec<Lock>, GatewayError> {
        let Some(account) = account else {
            self.clear().await;
            return Ok(Vec::new());
        };
        self.bind(account).await;

        let locks = fetch_locks(gateway, self.escrow, &account).await?;

        let mut cache = self.cache.write().await;
        // The account may have switched while the read was in flight
        if cache.account == Some(account) {
            cache.locks = locks.clone();
            cache.refreshed_at = Some(unix_now());
        }
        Ok(locks)
    }

    /// Re-read the allowance granted to the escrow for `token`
    pub async fn refresh_allowance<G: ContractGateway + ?Sized>(
        &self,
        gateway: &G,
        account: Option<Address>,
        token: Address,
    ) -> Result<Option<Amount>, GatewayError> {
        let Some(account) = account else {
            self.clear().await;
            return Ok(None);
        };
        self.bind(account).await;

        let allowance = fetch_allowance(gateway, token, &account, self.escrow).await?;

        let mut cache = self.cache.write().await;
        if cache.account == Some(account) {
            cache.allowances.insert(token, allowance);
        }
        tracing::debug!(account = %account, token = %token, allowance = %allowance, "Allowance read");
        Ok(Some(allowance))
    }

    /// Store an allowance known from a confirmed `approve`
    pub async fn record_allowance(&self, account: Address, token: Address, allowance: Amount) {
        let mut cache = self.cache.write().await;
        if cache.account == Some(account) {
            cache.allowances.insert(token, allowance);
        }
    }

    /// Forget everything (wallet disconnected)
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        *cache = RegistrySnapshot::default();
    }

    /// Forget the cache only if it still belongs to `account`
    pub async fn release(&self, account: Address) {
        let mut cache = self.cache.write().await;
        if cache.account == Some(account) {
            tracing::debug!(account = %account, "Releasing cache of inactive account");
            *cache = RegistrySnapshot::default();
        }
    }

    /// Point the cache at `account`, dropping another account's data
    async fn bind(&self, account: Address) {
        let mut cache = self.cache.write().await;
        if cache.account != Some(account) {
            if let Some(previous) = cache.account {
                tracing::info!(from = %previous, to = %account, "Account changed, cache reset");
            }
            *cache = RegistrySnapshot {
                account: Some(account),
                ..RegistrySnapshot::default()
            };
        }
    }
}
