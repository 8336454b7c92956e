//! Token Locker Protocol Implementation
//!
//! Lets the holder of a supported token lock an amount in the escrow
//! contract for a number of days and withdraw it once the lock matures.
//!
//! # Flow
//!
//! 1. The amount is encoded at 6 decimals ([`amount`])
//! 2. The allowance gate decides whether an `approve` must come first
//!    ([`allowance`])
//! 3. The controller submits `approve` / `lockTokens` / `withdraw`, waits
//!    for finality and refreshes the registry view ([`controller`])
//! 4. Locks are evaluated for maturity on every render ([`maturity`])

pub mod allowance;
pub mod amount;
pub mod constants;
pub mod controller;
pub mod fetch;
pub mod form;
pub mod maturity;
pub mod registry;
pub mod state;
pub mod tx_builder;

pub use allowance::needs_approval;
pub use amount::{decode_amount, encode_amount, encode_amount_or_zero, normalize_amount};
pub use constants::DURATION_PRESETS;
pub use controller::{ActionFailure, ActionKind, ActionState, LockController, Submission};
pub use fetch::{decode_locks, fetch_allowance, fetch_locks};
pub use form::{FormStatus, LockForm, LockIntent};
pub use maturity::{evaluate, unix_now, Maturity};
pub use registry::LockRegistry;
pub use state::{Lock, LockView, RegistrySnapshot};
