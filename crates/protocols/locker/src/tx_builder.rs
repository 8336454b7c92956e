//! Locker call builders
//!
//! Three state-changing calls:
//! 1. Approve:  exact-amount allowance for the escrow on a token
//! 2. Lock:     `lockTokens(token, amount, days)` on the escrow
//! 3. Withdraw: `withdraw(index)` on the escrow for a matured lock

use locker_core::{Address, Amount, LockError, UnixSeconds};
use locker_tx::ContractCall;

use crate::allowance::needs_approval;
use crate::form::LockIntent;
use crate::maturity::evaluate;
use crate::state::Lock;

/// Approve the escrow for exactly `amount` of `token`.
///
/// Never requests an unlimited allowance; a different lock amount needs a
/// new approval.
pub fn build_approve(escrow: Address, token: Address, amount: Amount) -> Result<ContractCall, LockError> {
    if amount == 0 {
        return Err(LockError::precondition("Nothing to approve for a zero amount"));
    }
    Ok(ContractCall::approve(token, escrow, amount))
}

/// Create a lock. The escrow turns `days` into an unlock timestamp.
pub fn build_lock(
    escrow: Address,
    intent: &LockIntent,
    allowance: Option<Amount>,
) -> Result<ContractCall, LockError> {
    if intent.amount == 0 {
        return Err(LockError::precondition("Amount must be greater than zero"));
    }
    if intent.days == 0 {
        return Err(LockError::precondition("Days must be greater than zero"));
    }
    if needs_approval(allowance, intent.amount) {
        return Err(LockError::precondition(format!(
            "Approval of {} required before locking",
            intent.symbol
        )));
    }
    Ok(ContractCall::lock_tokens(
        escrow,
        intent.token,
        intent.amount,
        intent.days,
    ))
}

/// Withdraw the lock at `index`; it must be matured and not yet withdrawn.
pub fn build_withdraw(
    escrow: Address,
    index: usize,
    lock: &Lock,
    now: UnixSeconds,
) -> Result<ContractCall, LockError> {
    if lock.withdrawn {
        return Err(LockError::precondition(format!(
            "Lock {} is already withdrawn",
            index
        )));
    }
    let maturity = evaluate(lock, now);
    if !maturity.withdrawable {
        return Err(LockError::precondition(format!(
            "Lock {} unlocks in {}",
            index,
            maturity.label()
        )));
    }
    let lock_id = u64::try_from(index)
        .map_err(|_| LockError::precondition(format!("Lock index {} out of range", index)))?;
    Ok(ContractCall::withdraw(escrow, lock_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_DAY;
    use locker_core::TokenSymbol;
    use locker_tx::ContractFunction;

    const NOW: UnixSeconds = 1_750_000_000;

    fn escrow() -> Address {
        "0xade936f9ace4d659226326860233bdeb5a946dea".parse().unwrap()
    }

    fn alpha() -> Address {
        "0x20c0000000000000000000000000000000000001".parse().unwrap()
    }

    fn intent(amount: Amount, days: u64) -> LockIntent {
        LockIntent {
            symbol: TokenSymbol::new("AlphaUSD"),
            token: alpha(),
            amount,
            days,
        }
    }

    #[test]
    fn test_approve_is_exact_amount() {
        let call = build_approve(escrow(), alpha(), 500_000_000).unwrap();
        assert_eq!(call.to, alpha());
        assert_eq!(
            call.function,
            ContractFunction::Approve {
                spender: escrow(),
                amount: 500_000_000
            }
        );
        assert!(build_approve(escrow(), alpha(), 0).is_err());
    }

    #[test]
    fn test_lock_requires_allowance() {
        assert!(build_lock(escrow(), &intent(500, 30), None).is_err());
        assert!(build_lock(escrow(), &intent(500, 30), Some(499)).is_err());

        let call = build_lock(escrow(), &intent(500, 30), Some(500)).unwrap();
        assert_eq!(call.to, escrow());
        assert_eq!(
            call.function,
            ContractFunction::LockTokens {
                token: alpha(),
                amount: 500,
                days: 30
            }
        );
    }

    #[test]
    fn test_lock_rejects_zero_values() {
        assert!(build_lock(escrow(), &intent(0, 30), Some(0)).is_err());
        assert!(build_lock(escrow(), &intent(5, 0), Some(5)).is_err());
    }

    #[test]
    fn test_withdraw_preconditions() {
        let future = Lock {
            token: alpha(),
            amount: 1,
            unlock_time: NOW + SECONDS_PER_DAY,
            withdrawn: false,
        };
        let err = build_withdraw(escrow(), 0, &future, NOW).unwrap_err();
        assert_eq!(err.error_code(), "precondition_not_met");

        let matured = Lock {
            unlock_time: NOW,
            ..future.clone()
        };
        let call = build_withdraw(escrow(), 2, &matured, NOW).unwrap();
        assert_eq!(call.function, ContractFunction::Withdraw { lock_id: 2 });

        let withdrawn = Lock {
            withdrawn: true,
            ..matured
        };
        assert!(build_withdraw(escrow(), 2, &withdrawn, NOW).is_err());
    }
}
