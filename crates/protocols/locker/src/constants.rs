//! Locker protocol constants

pub use locker_core::constants::{SECONDS_PER_DAY, TOKEN_DECIMALS};

/// Duration presets offered by the lock form: (label, days)
pub const DURATION_PRESETS: &[(&str, u64)] = &[
    ("1 Week", 7),
    ("1 Month", 30),
    ("3 Months", 90),
    ("6 Months", 180),
    ("1 Year", 365),
];
