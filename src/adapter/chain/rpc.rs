use crate::domain::ContractError;
use crate::port::{ChainRpc, TransactionReceipt};
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: B256,
    block_number: Option<String>,
    status: Option<String>,
}

/// JSON-RPC 2.0 over HTTP.
pub struct JsonRpcTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContractError::Rpc(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, ContractError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!("rpc {} id={}", method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ContractError::Rpc(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::Rpc(format!("{method}: HTTP {status}")));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ContractError::Rpc(format!("{method}: malformed response: {e}")))?;

        if let Some(err) = parsed.error {
            // 3 is the conventional code for execution reverted.
            if err.code == 3 || err.message.contains("revert") {
                return Err(ContractError::Reverted(err.message));
            }
            return Err(ContractError::Rpc(format!(
                "{method}: {} ({})",
                err.message, err.code
            )));
        }

        Ok(parsed.result)
    }

    async fn request_required<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ContractError> {
        self.request(method, params)
            .await?
            .ok_or_else(|| ContractError::Rpc(format!("{method}: empty result")))
    }
}

pub fn parse_quantity(raw: &str) -> Result<u64, ContractError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ContractError::Rpc(format!("invalid quantity {raw}: {e}")))
}

#[async_trait]
impl ChainRpc for JsonRpcTransport {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ContractError> {
        self.request_required("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, ContractError> {
        self.request_required(
            "eth_sendTransaction",
            json!([{ "from": from, "to": to, "data": data }]),
        )
        .await
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ContractError> {
        let raw: Option<RawReceipt> = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let block_number = raw.block_number.as_deref().map(parse_quantity).transpose()?;
        let success = match raw.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            // Pre-Byzantium receipts carry no status; treat as mined.
            None => true,
        };

        Ok(Some(TransactionReceipt {
            transaction_hash: raw.transaction_hash,
            block_number,
            success,
        }))
    }

    async fn accounts(&self) -> Result<Vec<Address>, ContractError> {
        self.request_required("eth_accounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, ContractError> {
        let raw: String = self.request_required("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }
}
