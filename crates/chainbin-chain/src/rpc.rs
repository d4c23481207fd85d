//! Minimal JSON-RPC 2.0 client for the read side of the entity store
//!
//! Speaks the node's `golembase_*` storage methods plus the two standard
//! `eth_*` calls the core needs (chain height, transaction receipts).
//! Every round-trip carries the configured timeout; timeouts and error
//! responses surface as transport errors with the node's message intact.
//! Submission is not here: it needs a signing wallet, which lives behind
//! [`crate::EntityWriter`].

use async_trait::async_trait;
use base64::Engine;
use chainbin_core::config::ChainConfig;
use chainbin_core::{ChainbinError, ChainbinResult, KvPair};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::receipt::{parse_hex_quantity, TransactionReceipt};
use crate::store::{EntityReader, StoredEntity};

pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcEntityMetadata {
    expires_at_block: u64,
    #[serde(default)]
    string_annotations: Vec<KvPair<String>>,
    #[serde(default)]
    numeric_annotations: Vec<KvPair<u64>>,
}

#[derive(Debug, Deserialize)]
struct RpcBlock {
    number: String,
}

impl RpcClient {
    pub fn new(chain: &ChainConfig) -> ChainbinResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(chain.rpc_timeout_secs))
            .build()
            .map_err(|e| ChainbinError::Rpc(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: chain.rpc_endpoint.clone(),
        })
    }

    /// One JSON-RPC call. `Ok(None)` when the node answers with a null
    /// result or a not-found error, both of which mean "no such thing"
    /// rather than a transport fault.
    async fn call(&self, method: &str, params: Value) -> ChainbinResult<Option<Value>> {
        tracing::debug!(method, "rpc request");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.endpoint.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainbinError::Rpc(format!("{method}: {e}")))?;

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainbinError::Rpc(format!("{method}: invalid response: {e}")))?;

        extract_result(method, response)
    }

    async fn call_typed<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> ChainbinResult<Option<R>> {
        match self.call(method, params).await? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ChainbinError::Rpc(format!("{method}: unexpected result shape: {e}"))),
        }
    }

    /// Poll the mined receipt for a submission. `Ok(None)` while the
    /// transaction is still pending.
    pub async fn transaction_receipt(
        &self,
        tx_id: &str,
    ) -> ChainbinResult<Option<TransactionReceipt>> {
        self.call_typed("eth_getTransactionReceipt", json!([tx_id]))
            .await
    }
}

fn extract_result(method: &str, response: RpcResponse) -> ChainbinResult<Option<Value>> {
    if let Some(err) = response.error {
        if err.message.to_lowercase().contains("not found") {
            return Ok(None);
        }
        return Err(ChainbinError::Rpc(format!(
            "{method} failed: {} (code {})",
            err.message, err.code
        )));
    }

    match response.result {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(value)),
    }
}

#[async_trait]
impl EntityReader for RpcClient {
    async fn entity(&self, id: &str) -> ChainbinResult<Option<StoredEntity>> {
        let metadata: Option<RpcEntityMetadata> = self
            .call_typed("golembase_getEntityMetaData", json!([id]))
            .await?;
        let Some(metadata) = metadata else {
            return Ok(None);
        };

        let value: Option<String> = self
            .call_typed("golembase_getStorageValue", json!([id]))
            .await?;
        // Metadata without a value means the entity expired between the
        // two calls; report it absent like any other miss.
        let Some(value) = value else {
            return Ok(None);
        };

        let payload = base64::engine::general_purpose::STANDARD
            .decode(value.as_bytes())
            .map_err(|e| ChainbinError::Rpc(format!("storage value is not base64: {e}")))?;

        Ok(Some(StoredEntity {
            payload,
            string_annotations: metadata.string_annotations,
            numeric_annotations: metadata.numeric_annotations,
            expires_at_block: metadata.expires_at_block,
        }))
    }

    async fn current_block_height(&self) -> ChainbinResult<u64> {
        let block: Option<RpcBlock> = self
            .call_typed("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        let block = block.ok_or_else(|| ChainbinError::Rpc("node returned no latest block".into()))?;

        parse_hex_quantity(&block.number).ok_or_else(|| {
            ChainbinError::Rpc(format!("latest block number is not hex: {}", block.number))
        })
    }
}
