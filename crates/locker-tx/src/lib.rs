//! locker-tx: Contract call building utilities
//!
//! Describes the calls made against the token-approval and lock-registry
//! interfaces and provides the Solidity ABI encoding they travel in.

pub mod abi;
pub mod calls;

pub use abi::*;
pub use calls::*;
