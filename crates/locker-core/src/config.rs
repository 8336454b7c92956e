//! Configuration types for the locker

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::types::{Address, ChainId, TokenSymbol};

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "LOCKER_CONFIG";

/// Environment variable overriding `gateway.rpc_url`
pub const RPC_URL_ENV: &str = "LOCKER_RPC_URL";

/// RPC gateway connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// JSON-RPC endpoint (e.g., "https://rpc.testnet.tempo.xyz")
    pub rpc_url: String,

    /// Upper bound for a single RPC request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between receipt polls while waiting for finality
    #[serde(default = "default_receipt_poll_interval_secs")]
    pub receipt_poll_interval_secs: u64,

    /// Give up waiting for a receipt after this long
    #[serde(default = "default_finality_timeout_secs")]
    pub finality_timeout_secs: u64,

    /// Explicit gas limit for submitted calls (wallet estimates when absent)
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_receipt_poll_interval_secs() -> u64 {
    2
}

fn default_finality_timeout_secs() -> u64 {
    40 * 60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.testnet.tempo.xyz".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            receipt_poll_interval_secs: default_receipt_poll_interval_secs(),
            finality_timeout_secs: default_finality_timeout_secs(),
            gas_limit: None,
        }
    }
}

/// A lockable token and its contract address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub symbol: TokenSymbol,
    pub address: Address,
}

/// Immutable symbol ⇄ address lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenTable {
    entries: Vec<TokenEntry>,
}

impl TokenTable {
    pub fn new(entries: Vec<TokenEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TokenEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a symbol (exact match) to its token address
    pub fn address_of(&self, symbol: &str) -> Option<Address> {
        self.entries
            .iter()
            .find(|e| e.symbol.as_str() == symbol)
            .map(|e| e.address)
    }

    /// Resolve a token address back to its symbol
    pub fn symbol_of(&self, address: &Address) -> Option<&TokenSymbol> {
        self.entries
            .iter()
            .find(|e| &e.address == address)
            .map(|e| &e.symbol)
    }

    /// Symbol for display, falling back to the raw address for unknown tokens
    pub fn display_name(&self, address: &Address) -> String {
        self.symbol_of(address)
            .map(|s| s.to_string())
            .unwrap_or_else(|| address.to_string())
    }

    fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::Config("Token table is empty".to_string()));
        }
        let mut symbols = HashSet::new();
        let mut addresses = HashSet::new();
        for entry in &self.entries {
            if !symbols.insert(entry.symbol.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate token symbol: {}",
                    entry.symbol
                )));
            }
            if !addresses.insert(entry.address) {
                return Err(Error::Config(format!(
                    "Duplicate token address: {}",
                    entry.address
                )));
            }
        }
        Ok(())
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        let entries = [
            ("pathUSD", 0u8),
            ("AlphaUSD", 1),
            ("BetaUSD", 2),
            ("ThetaUSD", 3),
        ]
        .into_iter()
        .map(|(symbol, last)| {
            let mut bytes = [0u8; 20];
            bytes[0] = 0x20;
            bytes[1] = 0xc0;
            bytes[19] = last;
            TokenEntry {
                symbol: TokenSymbol::new(symbol),
                address: Address::from_bytes(bytes),
            }
        })
        .collect();
        Self { entries }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// RPC gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Chain the escrow is deployed on
    #[serde(default = "default_chain_id")]
    pub chain_id: ChainId,

    /// Lock-registry (escrow) contract address
    #[serde(default = "default_escrow")]
    pub escrow: Address,

    /// Lockable tokens
    #[serde(default)]
    pub tokens: TokenTable,

    /// Token preselected in the lock form
    #[serde(default = "default_token")]
    pub default_token: TokenSymbol,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Maturity re-evaluation interval
    #[serde(default = "default_maturity_tick_secs")]
    pub maturity_tick_secs: u64,
}

fn default_chain_id() -> ChainId {
    42429
}

fn default_escrow() -> Address {
    Address::from_bytes([
        0xad, 0xe9, 0x36, 0xf9, 0xac, 0xe4, 0xd6, 0x59, 0x22, 0x63, 0x26, 0x86, 0x02, 0x33, 0xbd,
        0xeb, 0x5a, 0x94, 0x6d, 0xea,
    ])
}

fn default_token() -> TokenSymbol {
    TokenSymbol::new("AlphaUSD")
}

fn default_api_port() -> u16 {
    19080
}

fn default_maturity_tick_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            chain_id: default_chain_id(),
            escrow: default_escrow(),
            tokens: TokenTable::default(),
            default_token: default_token(),
            api_port: default_api_port(),
            maturity_tick_secs: default_maturity_tick_secs(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Load from `LOCKER_CONFIG` when set (defaults otherwise), then apply
    /// the `LOCKER_RPC_URL` override
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            config.gateway.rpc_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tokens.validate()?;
        if self.tokens.address_of(self.default_token.as_str()).is_none() {
            return Err(Error::Config(format!(
                "Default token {} is not in the token table",
                self.default_token
            )));
        }
        if self.gateway.rpc_url.is_empty() {
            return Err(Error::Config("gateway.rpc_url is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.rpc_url, "https://rpc.testnet.tempo.xyz");
        assert_eq!(config.chain_id, 42429);
        assert_eq!(
            config.escrow.to_string(),
            "0xade936f9ace4d659226326860233bdeb5a946dea"
        );
        assert_eq!(config.api_port, 19080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_token_table() {
        let table = TokenTable::default();
        assert_eq!(table.entries().len(), 4);
        assert_eq!(
            table.address_of("AlphaUSD").unwrap().to_string(),
            "0x20c0000000000000000000000000000000000001"
        );
        let theta: Address = "0x20C0000000000000000000000000000000000003".parse().unwrap();
        assert_eq!(table.symbol_of(&theta).unwrap().as_str(), "ThetaUSD");
        assert!(table.address_of("alphausd").is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_address() {
        let table = TokenTable::default();
        let unknown: Address = "0x1111111111111111111111111111111111111111".parse().unwrap();
        assert_eq!(
            table.display_name(&unknown),
            "0x1111111111111111111111111111111111111111"
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = AppConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.gateway.rpc_url, config.gateway.rpc_url);
        assert_eq!(parsed.tokens, config.tokens);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed =
            AppConfig::from_json_str(r#"{"gateway": {"rpc_url": "http://127.0.0.1:8545"}}"#)
                .unwrap();
        assert_eq!(parsed.gateway.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(parsed.gateway.receipt_poll_interval_secs, 2);
        assert_eq!(parsed.tokens.entries().len(), 4);
    }

    #[test]
    fn test_rejects_duplicate_symbols() {
        let json = r#"{
            "tokens": [
                {"symbol": "AlphaUSD", "address": "0x20c0000000000000000000000000000000000001"},
                {"symbol": "AlphaUSD", "address": "0x20c0000000000000000000000000000000000002"}
            ]
        }"#;
        assert!(matches!(
            AppConfig::from_json_str(json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_default_token() {
        let json = r#"{"default_token": "GammaUSD"}"#;
        assert!(matches!(
            AppConfig::from_json_str(json),
            Err(Error::Config(_))
        ));
    }
}
