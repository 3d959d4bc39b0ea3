//! JSON-RPC client for a Sui full node.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::client::{ChainClient, ChainError, CoinObjectRef};
use crate::effects::TransactionResult;
use crate::signer::TransactionSigner;
use crate::transaction::TransactionRequest;

/// Public testnet RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://sui-testnet-rpc.publicnode.com";

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    total_balance: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<CoinEntry>,
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinEntry {
    coin_object_id: String,
    balance: String,
}

impl CoinEntry {
    fn into_ref(self) -> Result<CoinObjectRef, ChainError> {
        let balance = self
            .balance
            .parse()
            .map_err(|_| ChainError::Decode(format!("coin balance {:?}", self.balance)))?;
        Ok(CoinObjectRef {
            id: self.coin_object_id,
            balance,
        })
    }
}

/// [`ChainClient`] over HTTP JSON-RPC.
pub struct SuiRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl std::fmt::Debug for SuiRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiRpcClient").field("url", &self.url).finish()
    }
}

impl SuiRpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        let url = url.into();
        info!(url = %url, "Initializing Sui RPC client");
        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    /// Issue one JSON-RPC call and decode its `result`.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.client.post(&self.url).json(&body).send().await?;
        if response.status().as_u16() == 429 {
            return Err(ChainError::RateLimited);
        }
        let response = response.error_for_status()?;
        let envelope: RpcResponse<T> = response.json().await?;
        decode_envelope(envelope)
    }
}

fn decode_envelope<T>(envelope: RpcResponse<T>) -> Result<T, ChainError> {
    if let Some(err) = envelope.error {
        if err.message.contains("429") || err.message.to_lowercase().contains("too many requests") {
            return Err(ChainError::RateLimited);
        }
        return Err(ChainError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| ChainError::Decode("response carried neither result nor error".into()))
}

#[async_trait]
impl ChainClient for SuiRpcClient {
    async fn get_balance(&self, address: &str) -> Result<u64, ChainError> {
        let balance: BalanceResponse = self.call("suix_getBalance", json!([address])).await?;
        balance
            .total_balance
            .parse()
            .map_err(|_| ChainError::Decode(format!("total balance {:?}", balance.total_balance)))
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_coins(
        &self,
        address: &str,
        coin_type: &str,
    ) -> Result<Vec<CoinObjectRef>, ChainError> {
        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page: CoinPage = self
                .call("suix_getCoins", json!([address, coin_type, cursor, Value::Null]))
                .await?;
            for entry in page.data {
                coins.push(entry.into_ref()?);
            }
            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        debug!(count = coins.len(), "Fetched coin objects");
        Ok(coins)
    }

    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
        signer: &dyn TransactionSigner,
    ) -> Result<TransactionResult, ChainError> {
        let signed = signer.sign(request).await?;
        let raw: Value = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    signed.tx_bytes,
                    [signed.signature],
                    {
                        "showEffects": true,
                        "showEvents": true,
                        "showObjectChanges": true
                    },
                    "WaitForLocalExecution"
                ]),
            )
            .await?;

        let result = TransactionResult::from_rpc(raw)?;
        if !result.is_success() {
            warn!(
                digest = %result.digest,
                error = result.error.as_deref().unwrap_or("unknown"),
                "Transaction executed with failure status"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_page_decodes() {
        let page: CoinPage = serde_json::from_value(json!({
            "data": [
                { "coinObjectId": "0x1", "balance": "1500", "coinType": "0x2::sui::SUI" },
                { "coinObjectId": "0x2", "balance": "25" }
            ],
            "nextCursor": "0x2",
            "hasNextPage": false
        }))
        .unwrap();

        let refs: Vec<_> = page
            .data
            .into_iter()
            .map(|c| c.into_ref().unwrap())
            .collect();
        assert_eq!(refs[0].balance, 1500);
        assert_eq!(refs[1].id, "0x2");
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_bad_coin_balance() {
        let entry = CoinEntry {
            coin_object_id: "0x1".into(),
            balance: "not-a-number".into(),
        };
        assert!(matches!(entry.into_ref(), Err(ChainError::Decode(_))));
    }

    #[test]
    fn test_envelope_errors() {
        let limited: RpcResponse<Value> = serde_json::from_value(json!({
            "error": { "code": -32000, "message": "Request failed with status 429" }
        }))
        .unwrap();
        assert!(matches!(decode_envelope(limited), Err(ChainError::RateLimited)));

        let rpc: RpcResponse<Value> = serde_json::from_value(json!({
            "error": { "code": -32602, "message": "Invalid params" }
        }))
        .unwrap();
        assert!(matches!(
            decode_envelope(rpc),
            Err(ChainError::Rpc { code: -32602, .. })
        ));

        let ok: RpcResponse<BalanceResponse> =
            serde_json::from_value(json!({ "result": { "totalBalance": "42" } })).unwrap();
        assert_eq!(decode_envelope(ok).unwrap().total_balance, "42");
    }
}
