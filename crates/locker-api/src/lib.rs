//! locker-api: HTTP API layer for the token locker
//!
//! Exposes the lock controller to a frontend as JSON over HTTP.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, Controller};
