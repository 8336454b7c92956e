//! Contract calls against the token and lock-registry interfaces

use std::fmt;

use locker_core::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::abi::{encode_address, encode_call, encode_uint, selector};

/// The two contract interfaces this system talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    /// ERC-20 style approval interface on each token
    Token,
    /// The escrow contract
    LockRegistry,
}

/// A function on one of the two interfaces, with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum ContractFunction {
    Approve { spender: Address, amount: Amount },
    Allowance { owner: Address, spender: Address },
    LockTokens { token: Address, amount: Amount, days: u64 },
    Withdraw { lock_id: u64 },
    GetMyLocks,
}

impl ContractFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Allowance { .. } => "allowance",
            Self::LockTokens { .. } => "lockTokens",
            Self::Withdraw { .. } => "withdraw",
            Self::GetMyLocks => "getMyLocks",
        }
    }

    /// Canonical signature used for the selector
    pub fn signature(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve(address,uint256)",
            Self::Allowance { .. } => "allowance(address,address)",
            Self::LockTokens { .. } => "lockTokens(address,uint256,uint256)",
            Self::Withdraw { .. } => "withdraw(uint256)",
            Self::GetMyLocks => "getMyLocks()",
        }
    }

    pub fn interface(&self) -> Interface {
        match self {
            Self::Approve { .. } | Self::Allowance { .. } => Interface::Token,
            Self::LockTokens { .. } | Self::Withdraw { .. } | Self::GetMyLocks => {
                Interface::LockRegistry
            }
        }
    }

    /// View functions are read with `eth_call`; the rest are submitted
    pub fn is_view(&self) -> bool {
        matches!(self, Self::Allowance { .. } | Self::GetMyLocks)
    }

    pub fn calldata(&self) -> Vec<u8> {
        let sel = selector(self.signature());
        match self {
            Self::Approve { spender, amount } => {
                encode_call(sel, &[encode_address(spender), encode_uint(*amount)])
            }
            Self::Allowance { owner, spender } => {
                encode_call(sel, &[encode_address(owner), encode_address(spender)])
            }
            Self::LockTokens {
                token,
                amount,
                days,
            } => encode_call(
                sel,
                &[
                    encode_address(token),
                    encode_uint(*amount),
                    encode_uint(u128::from(*days)),
                ],
            ),
            Self::Withdraw { lock_id } => encode_call(sel, &[encode_uint(u128::from(*lock_id))]),
            Self::GetMyLocks => encode_call(sel, &[]),
        }
    }
}

/// A function call addressed to a specific contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub to: Address,
    #[serde(flatten)]
    pub function: ContractFunction,
}

impl ContractCall {
    /// `token.approve(spender, amount)`
    pub fn approve(token: Address, spender: Address, amount: Amount) -> Self {
        Self {
            to: token,
            function: ContractFunction::Approve { spender, amount },
        }
    }

    /// `token.allowance(owner, spender)`
    pub fn allowance(token: Address, owner: Address, spender: Address) -> Self {
        Self {
            to: token,
            function: ContractFunction::Allowance { owner, spender },
        }
    }

    /// `escrow.lockTokens(token, amount, days)`
    pub fn lock_tokens(escrow: Address, token: Address, amount: Amount, days: u64) -> Self {
        Self {
            to: escrow,
            function: ContractFunction::LockTokens {
                token,
                amount,
                days,
            },
        }
    }

    /// `escrow.withdraw(lockId)`
    pub fn withdraw(escrow: Address, lock_id: u64) -> Self {
        Self {
            to: escrow,
            function: ContractFunction::Withdraw { lock_id },
        }
    }

    /// `escrow.getMyLocks()`, scoped to the caller
    pub fn get_my_locks(escrow: Address) -> Self {
        Self {
            to: escrow,
            function: ContractFunction::GetMyLocks,
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        self.function.calldata()
    }

    pub fn is_view(&self) -> bool {
        self.function.is_view()
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.function.name(), self.to)
    }
}
