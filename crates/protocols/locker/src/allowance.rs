//! Allowance gate
//!
//! Allowance is per (owner, escrow, token), so the verdict must be recomputed
//! whenever the selected token changes.

use locker_core::Amount;

/// Whether an `approve` must precede a lock of `requested`.
///
/// An allowance that has not been read yet counts as insufficient.
pub fn needs_approval(current: Option<Amount>, requested: Amount) -> bool {
    match current {
        None => true,
        Some(allowance) => allowance < requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_allowance_always_needs_approval() {
        for amount in [0, 1, 100, u128::MAX] {
            assert!(needs_approval(None, amount));
        }
    }

    #[test]
    fn test_known_allowance() {
        assert!(!needs_approval(Some(100), 100));
        assert!(needs_approval(Some(99), 100));
        assert!(!needs_approval(Some(0), 0));
        assert!(!needs_approval(Some(u128::MAX), 500_000_000));
    }
}
