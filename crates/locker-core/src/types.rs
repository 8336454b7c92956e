//! Core type definitions for the locker

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

/// Token amount in the smallest unit (6 decimals for every supported token)
pub type Amount = u128;

/// Unix timestamp in seconds
pub type UnixSeconds = u64;

/// EVM chain ID
pub type ChainId = u64;

/// Account or contract address (20 bytes).
///
/// Parsed case-insensitively from `0x`-prefixed hex and always rendered
/// lowercase, so two spellings of the same address compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = parse_prefixed_hex::<20>(s).ok_or_else(|| ParseError::InvalidAddress {
            value: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Transaction hash (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = parse_prefixed_hex::<32>(s).ok_or_else(|| ParseError::InvalidTxHash {
            value: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for TxHash {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_string()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Token ticker symbol (e.g. "AlphaUSD")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSymbol(pub String);

impl TokenSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TokenSymbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn parse_prefixed_hex<const N: usize>(s: &str) -> Option<[u8; N]> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))?;
    if digits.len() != N * 2 {
        return None;
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).ok()?;
    Some(out)
}

/// Constants
pub mod constants {
    use super::UnixSeconds;

    /// Decimal precision shared by every lockable token
    pub const TOKEN_DECIMALS: u32 = 6;

    /// Seconds in one lock day
    pub const SECONDS_PER_DAY: UnixSeconds = 86_400;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_is_case_insensitive() {
        let upper: Address = "0xADE936F9ACE4D659226326860233BDEB5A946DEA".parse().unwrap();
        let mixed: Address = "0xade936F9aCe4d659226326860233BDEB5A946DEA".parse().unwrap();
        assert_eq!(upper, mixed);
        assert_eq!(
            mixed.to_string(),
            "0xade936f9ace4d659226326860233bdeb5a946dea"
        );
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!("ade936f9ace4d659226326860233bdeb5a946dea".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz e936f9ace4d659226326860233bdeb5a946d"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn test_address_serde_roundtrip() {
        let addr: Address = "0x20c0000000000000000000000000000000000001".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x20c0000000000000000000000000000000000001\"");
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_tx_hash_display() {
        let hash = TxHash::from_bytes([0xab; 32]);
        let s = hash.to_string();
        assert!(s.starts_with("0xabab"));
        assert_eq!(s.len(), 66);
        assert_eq!(s.parse::<TxHash>().unwrap(), hash);
    }
}
