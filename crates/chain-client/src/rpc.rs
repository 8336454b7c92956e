//! Ethereum JSON-RPC implementation of the contract gateway

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use locker_core::{Address, GatewayConfig, GatewayError, TxHash};
use locker_tx::{from_hex_data, to_hex_data, ContractCall};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ContractGateway, Finality, Result};

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    status: Option<String>,
    block_number: Option<String>,
}

/// JSON-RPC client bound to one endpoint
pub struct RpcGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    next_id: AtomicU64,
}

impl RpcGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("tempo-locker")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Unreachable {
                url: format!("{}: {}", config.rpc_url, e),
            })?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Issue one JSON-RPC request. A `null` result deserializes as `T`'s
    /// representation of null (use `Option<_>` for nullable methods).
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        secs: self.config.request_timeout_secs,
                    }
                } else {
                    GatewayError::Unreachable {
                        url: format!("{}: {}", self.config.rpc_url, e),
                    }
                }
            })?;

        let parsed: RpcResponse<Value> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("{} response: {}", method, e)))?;

        if let Some(err) = parsed.error {
            tracing::debug!(method, code = err.code, message = %err.message, "RPC error");
            return Err(GatewayError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        serde_json::from_value(parsed.result.unwrap_or(Value::Null))
            .map_err(|e| GatewayError::Decode(format!("{} result: {}", method, e)))
    }

    async fn receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>> {
        self.request("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await
    }
}

#[async_trait]
impl ContractGateway for RpcGateway {
    async fn read(&self, from: Option<&Address>, call: &ContractCall) -> Result<Vec<u8>> {
        let mut tx = json!({
            "to": call.to.to_string(),
            "data": to_hex_data(&call.calldata()),
        });
        if let Some(from) = from {
            tx["from"] = json!(from.to_string());
        }

        let result: String = self.request("eth_call", json!([tx, "latest"])).await?;
        from_hex_data(&result).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn submit(&self, from: &Address, call: &ContractCall) -> Result<TxHash> {
        let mut tx = json!({
            "from": from.to_string(),
            "to": call.to.to_string(),
            "data": to_hex_data(&call.calldata()),
        });
        if let Some(gas) = self.config.gas_limit {
            tx["gas"] = json!(format!("0x{:x}", gas));
        }

        tracing::debug!(call = %call, from = %from, "Submitting call");
        let hash: String = self.request("eth_sendTransaction", json!([tx])).await?;
        hash.parse()
            .map_err(|e: locker_core::ParseError| GatewayError::Decode(e.to_string()))
    }

    async fn await_finality(&self, tx_hash: &TxHash) -> Result<Finality> {
        let poll_interval = Duration::from_secs(self.config.receipt_poll_interval_secs.max(1));
        let timeout = Duration::from_secs(self.config.finality_timeout_secs);
        let started = Instant::now();

        loop {
            match self.receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.block_number.is_some() => {
                    let finality = match receipt.status.as_deref() {
                        Some("0x1") => Finality::Success,
                        _ => Finality::Reverted,
                    };
                    tracing::debug!(tx_hash = %tx_hash, ?finality, "Receipt observed");
                    return Ok(finality);
                }
                Ok(_) => {}
                // A single failed poll is not fatal; the deadline bounds the wait
                Err(e) => tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
            }

            if started.elapsed() >= timeout {
                return Err(GatewayError::Timeout {
                    secs: self.config.finality_timeout_secs,
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
