//! Locker state types

use std::collections::BTreeMap;

use locker_core::{Address, Amount, TokenTable, UnixSeconds};
use serde::{Deserialize, Serialize};

use crate::amount::decode_amount;
use crate::constants::TOKEN_DECIMALS;
use crate::maturity::evaluate;

/// One escrow entry as returned by `getMyLocks`.
///
/// Locks have no id of their own: the position in the bulk read is the
/// argument to `withdraw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    pub token: Address,
    /// Smallest token unit
    pub amount: Amount,
    /// Unix seconds, set by the escrow at creation
    pub unlock_time: UnixSeconds,
    pub withdrawn: bool,
}

/// A lock prepared for display, evaluated against a specific `now`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockView {
    pub index: usize,
    pub token: Address,
    /// Token symbol, or the raw address when the token is not in the table
    pub token_name: String,
    /// Integer amount as a string (JSON numbers cannot carry u128)
    pub amount: String,
    pub amount_display: String,
    pub unlock_time: UnixSeconds,
    pub withdrawn: bool,
    pub withdrawable: bool,
    pub days_remaining: u64,
    pub unlock_label: String,
    /// Withdraw button enabled
    pub can_withdraw: bool,
}

impl LockView {
    pub fn new(
        index: usize,
        lock: &Lock,
        tokens: &TokenTable,
        now: UnixSeconds,
        call_in_flight: bool,
    ) -> Self {
        let maturity = evaluate(lock, now);
        Self {
            index,
            token: lock.token,
            token_name: tokens.display_name(&lock.token),
            amount: lock.amount.to_string(),
            amount_display: decode_amount(lock.amount, TOKEN_DECIMALS),
            unlock_time: lock.unlock_time,
            withdrawn: lock.withdrawn,
            withdrawable: maturity.withdrawable,
            days_remaining: maturity.days_remaining,
            unlock_label: maturity.label(),
            can_withdraw: maturity.withdrawable && !lock.withdrawn && !call_in_flight,
        }
    }
}

/// Point-in-time copy of the registry cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    /// Account the cache belongs to; `None` while disconnected
    pub account: Option<Address>,
    pub locks: Vec<Lock>,
    /// Last read allowance per token address
    pub allowances: BTreeMap<Address, Amount>,
    /// When the lock set was last read successfully
    pub refreshed_at: Option<UnixSeconds>,
}

impl RegistrySnapshot {
    /// Cached allowance for `token`, `None` until it has been read
    pub fn allowance(&self, token: &Address) -> Option<Amount> {
        self.allowances.get(token).copied()
    }

    pub fn lock(&self, index: usize) -> Option<&Lock> {
        self.locks.get(index)
    }

    /// Locks not yet withdrawn
    pub fn active_count(&self) -> usize {
        self.locks.iter().filter(|l| !l.withdrawn).count()
    }

    pub fn views(&self, tokens: &TokenTable, now: UnixSeconds, call_in_flight: bool) -> Vec<LockView> {
        self.locks
            .iter()
            .enumerate()
            .map(|(i, lock)| LockView::new(i, lock, tokens, now, call_in_flight))
            .collect()
    }
}
