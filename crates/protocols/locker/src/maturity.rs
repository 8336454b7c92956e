//! Lock maturity evaluation
//!
//! `now` advances without any chain event, so callers re-run [`evaluate`] on
//! every render or tick instead of caching the result.

use std::time::{SystemTime, UNIX_EPOCH};

use locker_core::UnixSeconds;
use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_DAY;
use crate::state::Lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maturity {
    pub withdrawable: bool,
    /// Whole days until unlock, rounded up; 0 once withdrawable
    pub days_remaining: u64,
}

impl Maturity {
    pub fn label(&self) -> String {
        match (self.withdrawable, self.days_remaining) {
            (true, _) => "Available now".to_string(),
            (false, 1) => "1 day".to_string(),
            (false, n) => format!("{} days", n),
        }
    }
}

pub fn evaluate(lock: &Lock, now: UnixSeconds) -> Maturity {
    let remaining = lock.unlock_time.saturating_sub(now);
    Maturity {
        withdrawable: now >= lock.unlock_time,
        days_remaining: remaining.div_ceil(SECONDS_PER_DAY),
    }
}

/// Current wall-clock time in unix seconds
pub fn unix_now() -> UnixSeconds {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker_core::Address;

    const T: UnixSeconds = 1_750_000_000;

    fn lock_at(unlock_time: UnixSeconds) -> Lock {
        Lock {
            token: Address::ZERO,
            amount: 1,
            unlock_time,
            withdrawn: false,
        }
    }

    #[test]
    fn test_withdrawable_at_unlock_time() {
        let m = evaluate(&lock_at(T), T);
        assert!(m.withdrawable);
        assert_eq!(m.days_remaining, 0);
        assert_eq!(m.label(), "Available now");
    }

    #[test]
    fn test_three_days_out() {
        let m = evaluate(&lock_at(T + SECONDS_PER_DAY * 3), T);
        assert!(!m.withdrawable);
        assert_eq!(m.days_remaining, 3);
        assert_eq!(m.label(), "3 days");
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let m = evaluate(&lock_at(T + 1), T);
        assert!(!m.withdrawable);
        assert_eq!(m.days_remaining, 1);
        assert_eq!(m.label(), "1 day");

        let m = evaluate(&lock_at(T + SECONDS_PER_DAY + 1), T);
        assert_eq!(m.days_remaining, 2);
    }

    #[test]
    fn test_past_unlock_never_negative() {
        let m = evaluate(&lock_at(T), T + SECONDS_PER_DAY * 10);
        assert!(m.withdrawable);
        assert_eq!(m.days_remaining, 0);
    }

    #[test]
    fn test_time_alone_matures_a_lock() {
        let lock = lock_at(T + 100);
        assert!(!evaluate(&lock, T).withdrawable);
        assert!(evaluate(&lock, T + 100).withdrawable);
    }
}
