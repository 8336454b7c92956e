//! Chain status probing
//!
//! Checks the endpoint is reachable and serving the expected chain.

use locker_core::ChainId;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::rpc::RpcGateway;

/// Endpoint status detected through probing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStatus {
    /// Endpoint is reachable and responding
    pub online: bool,

    /// Chain ID reported by the endpoint
    pub chain_id: Option<ChainId>,

    /// Latest block number
    pub block_number: Option<u64>,

    /// Reported chain ID equals the configured one
    pub chain_matches: bool,
}

impl ChainStatus {
    pub fn offline() -> Self {
        Self {
            online: false,
            chain_id: None,
            block_number: None,
            chain_matches: false,
        }
    }
}

/// Parse a JSON-RPC quantity ("0x1a")
pub fn parse_quantity(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

impl RpcGateway {
    /// Probe `eth_chainId` and `eth_blockNumber`
    pub async fn probe(&self, expected_chain: ChainId) -> ChainStatus {
        let chain_id = match self.request::<String>("eth_chainId", json!([])).await {
            Ok(hex) => parse_quantity(&hex),
            Err(e) => {
                tracing::warn!(url = %self.config().rpc_url, error = %e, "Chain probe failed");
                return ChainStatus::offline();
            }
        };

        let block_number = self
            .request::<String>("eth_blockNumber", json!([]))
            .await
            .ok()
            .and_then(|hex| parse_quantity(&hex));

        let chain_matches = chain_id == Some(expected_chain);
        if !chain_matches {
            tracing::warn!(
                expected = expected_chain,
                reported = ?chain_id,
                "Endpoint serves a different chain"
            );
        }

        ChainStatus {
            online: true,
            chain_id,
            block_number,
            chain_matches,
        }
    }
}
