//! Background maturity watcher
//!
//! Re-evaluates the cached locks on a fixed tick and logs each lock the
//! first time it becomes withdrawable. Only the cache is inspected; the
//! registry is never read from here.

use std::collections::BTreeSet;
use std::time::Duration;

use chain_client::{ContractGateway, WalletSession};
use locker::{LockController, LockView, RegistrySnapshot};
use locker_core::{Address, TokenTable, UnixSeconds};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Default)]
pub struct MaturityWatcher {
    account: Option<Address>,
    /// Indices already reported as withdrawable
    announced: BTreeSet<usize>,
}

impl MaturityWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks that became withdrawable since the previous observation
    pub fn observe(
        &mut self,
        snapshot: &RegistrySnapshot,
        tokens: &TokenTable,
        now: UnixSeconds,
    ) -> Vec<LockView> {
        if snapshot.account != self.account {
            self.account = snapshot.account;
            self.announced.clear();
        }

        let withdrawable: Vec<LockView> = snapshot
            .views(tokens, now, false)
            .into_iter()
            .filter(|view| view.withdrawable && !view.withdrawn)
            .collect();

        // Withdrawn locks drop out so the set tracks the live cache
        self.announced
            .retain(|index| withdrawable.iter().any(|view| view.index == *index));

        withdrawable
            .into_iter()
            .filter(|view| self.announced.insert(view.index))
            .collect()
    }
}

/// Spawn the watcher loop for `controller`
pub fn spawn<G, W>(controller: LockController<G, W>, tick: Duration) -> JoinHandle<()>
where
    G: ContractGateway + 'static,
    W: WalletSession + 'static,
{
    tokio::spawn(async move {
        let mut watcher = MaturityWatcher::new();
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let snapshot = controller.snapshot().await;
            for view in watcher.observe(&snapshot, controller.tokens(), controller.now()) {
                tracing::info!(
                    index = view.index,
                    token = %view.token_name,
                    amount = %view.amount_display,
                    "Lock is withdrawable"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker::Lock;

    const NOW: UnixSeconds = 1_750_000_000;

    fn alpha() -> Address {
        "0x20c0000000000000000000000000000000000001".parse().unwrap()
    }

    fn snapshot(account: &str, unlock_times: &[UnixSeconds]) -> RegistrySnapshot {
        RegistrySnapshot {
            account: Some(account.parse().unwrap()),
            locks: unlock_times
                .iter()
                .map(|&unlock_time| Lock {
                    token: alpha(),
                    amount: 1_000_000,
                    unlock_time,
                    withdrawn: false,
                })
                .collect(),
            ..RegistrySnapshot::default()
        }
    }

    #[test]
    fn test_reports_each_lock_once() {
        let tokens = TokenTable::default();
        let alice = "0x1111111111111111111111111111111111111111";
        let snap = snapshot(alice, &[NOW - 10, NOW + 100]);
        let mut watcher = MaturityWatcher::new();

        let first = watcher.observe(&snap, &tokens, NOW);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].index, 0);
        assert_eq!(first[0].token_name, "AlphaUSD");

        assert!(watcher.observe(&snap, &tokens, NOW).is_empty());

        let later = watcher.observe(&snap, &tokens, NOW + 100);
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].index, 1);
    }

    #[test]
    fn test_account_switch_resets() {
        let tokens = TokenTable::default();
        let mut watcher = MaturityWatcher::new();

        let alice = snapshot("0x1111111111111111111111111111111111111111", &[NOW]);
        let bob = snapshot("0x2222222222222222222222222222222222222222", &[NOW]);

        assert_eq!(watcher.observe(&alice, &tokens, NOW).len(), 1);
        assert_eq!(watcher.observe(&bob, &tokens, NOW).len(), 1);
        assert!(watcher.observe(&RegistrySnapshot::default(), &tokens, NOW).is_empty());
    }

    #[test]
    fn test_withdrawn_locks_are_ignored() {
        let tokens = TokenTable::default();
        let mut watcher = MaturityWatcher::new();
        let mut snap = snapshot("0x1111111111111111111111111111111111111111", &[NOW]);
        snap.locks[0].withdrawn = true;

        assert!(watcher.observe(&snap, &tokens, NOW).is_empty());
    }
}
