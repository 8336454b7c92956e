//! Lock form validation
//!
//! The form holds raw user input. [`LockForm::validate`] turns it into a
//! [`LockIntent`] the controller can submit; [`LockForm::status`] reports which
//! buttons should be enabled without raising errors while the user types.

use locker_core::{Address, Amount, LockError, TokenSymbol, TokenTable};
use serde::{Deserialize, Serialize};

use crate::allowance::needs_approval;
use crate::amount::{encode_amount, encode_amount_or_zero};
use crate::constants::TOKEN_DECIMALS;
use crate::state::RegistrySnapshot;

/// Pending user input for a new lock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockForm {
    pub token: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub days: String,
}

/// A validated lock request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockIntent {
    pub symbol: TokenSymbol,
    pub token: Address,
    pub amount: Amount,
    pub days: u64,
}

/// Enabled/disabled state of the form actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub needs_approval: bool,
    pub can_approve: bool,
    pub can_lock: bool,
    /// Why the input cannot be used yet, if it is malformed
    pub problem: Option<String>,
}

/// Parse a whole, positive day count
pub fn parse_days(input: &str) -> Result<u64, LockError> {
    let s = input.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LockError::InvalidDuration {
            message: format!("Days must be a whole number, got {:?}", s),
        });
    }
    let days: u64 = s.parse().map_err(|_| LockError::InvalidDuration {
        message: format!("Days out of range: {}", s),
    })?;
    if days == 0 {
        return Err(LockError::InvalidDuration {
            message: "Days must be greater than zero".to_string(),
        });
    }
    Ok(days)
}

pub fn resolve_token(tokens: &TokenTable, symbol: &str) -> Result<Address, LockError> {
    tokens
        .address_of(symbol)
        .ok_or_else(|| LockError::UnknownToken {
            symbol: symbol.to_string(),
        })
}

impl LockForm {
    pub fn new(token: impl Into<String>, amount: impl Into<String>, days: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            amount: amount.into(),
            days: days.into(),
        }
    }

    pub fn validate(&self, tokens: &TokenTable) -> Result<LockIntent, LockError> {
        let token = resolve_token(tokens, &self.token)?;
        let amount = encode_amount(&self.amount, TOKEN_DECIMALS)?;
        if amount == 0 {
            return Err(LockError::precondition("Amount must be greater than zero"));
        }
        let days = parse_days(&self.days)?;
        Ok(LockIntent {
            symbol: TokenSymbol::new(self.token.clone()),
            token,
            amount,
            days,
        })
    }

    /// Button state for the current input against a registry snapshot
    pub fn status(
        &self,
        tokens: &TokenTable,
        snapshot: &RegistrySnapshot,
        call_in_flight: bool,
    ) -> FormStatus {
        let token = match resolve_token(tokens, &self.token) {
            Ok(t) => t,
            Err(e) => return FormStatus::blocked(e.to_string()),
        };
        let amount = match encode_amount_or_zero(&self.amount, TOKEN_DECIMALS) {
            Ok(a) => a,
            Err(e) => return FormStatus::blocked(e.to_string()),
        };

        let needs_approval = needs_approval(snapshot.allowance(&token), amount);
        let connected = snapshot.account.is_some();
        let has_days = parse_days(&self.days).is_ok();

        FormStatus {
            needs_approval,
            can_approve: needs_approval && connected && amount > 0 && !call_in_flight,
            can_lock: !needs_approval && connected && amount > 0 && has_days && !call_in_flight,
            problem: None,
        }
    }
}

impl FormStatus {
    fn blocked(problem: String) -> Self {
        Self {
            needs_approval: true,
            can_approve: false,
            can_lock: false,
            problem: Some(problem),
        }
    }
}
