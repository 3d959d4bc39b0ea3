//! Sui testnet faucet client.
//!
//! Requests are sent directly or through a per-wallet HTTP proxy. One
//! `reqwest::Client` is built per distinct proxy URL and reused.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Public testnet faucet endpoint.
pub const DEFAULT_FAUCET_URL: &str = "https://faucet.testnet.sui.io/v2/gas";

/// Errors building a faucet client.
#[derive(Debug, Error)]
pub enum FaucetError {
    #[error("invalid proxy url {url}: {reason}")]
    InvalidProxy { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Classified outcome of one faucet request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetResponse {
    /// Request accepted; funds are on their way.
    Funded,
    /// Endpoint answered 429.
    RateLimited,
    /// Anything else, with a short reason.
    Rejected(String),
}

impl FaucetResponse {
    pub fn is_funded(&self) -> bool {
        matches!(self, Self::Funded)
    }
}

/// Classify a raw faucet reply.
///
/// A 200 whose body reports `status.Failure` is a rejection, not a success.
pub fn classify_response(status: u16, body: &str) -> FaucetResponse {
    match status {
        429 => FaucetResponse::RateLimited,
        200 => match serde_json::from_str::<Value>(body) {
            Ok(data) => match data.get("status").and_then(|s| s.get("Failure")) {
                Some(failure) => FaucetResponse::Rejected(
                    failure
                        .get("Internal")
                        .and_then(Value::as_str)
                        .unwrap_or("Error")
                        .to_string(),
                ),
                None => FaucetResponse::Funded,
            },
            Err(_) => FaucetResponse::Rejected("Invalid JSON".to_string()),
        },
        other => FaucetResponse::Rejected(format!("Status {}", other)),
    }
}

/// Native-token faucet.
#[async_trait]
pub trait FaucetApi: Send + Sync {
    /// Ask the faucet to fund `recipient`, optionally through `proxy`.
    async fn request_gas(&self, recipient: &str, proxy: Option<&str>) -> FaucetResponse;
}

/// HTTP faucet client with per-proxy client reuse.
pub struct FaucetClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    /// Proxy URL -> client routed through it
    proxied: DashMap<String, reqwest::Client>,
}

impl std::fmt::Debug for FaucetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaucetClient")
            .field("url", &self.url)
            .field("proxies", &self.proxied.len())
            .finish()
    }
}

impl FaucetClient {
    pub fn new(url: impl Into<String>) -> Result<Self, FaucetError> {
        let timeout = Duration::from_secs(30);
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
            timeout,
            proxied: DashMap::new(),
        })
    }

    fn client_for(&self, proxy: Option<&str>) -> Result<reqwest::Client, FaucetError> {
        let Some(proxy) = proxy else {
            return Ok(self.client.clone());
        };
        if let Some(client) = self.proxied.get(proxy) {
            return Ok(client.clone());
        }

        let route = reqwest::Proxy::all(proxy).map_err(|e| FaucetError::InvalidProxy {
            url: proxy.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .proxy(route)
            .build()?;
        self.proxied.insert(proxy.to_string(), client.clone());
        Ok(client)
    }
}

#[async_trait]
impl FaucetApi for FaucetClient {
    #[instrument(skip(self), fields(recipient = %recipient))]
    async fn request_gas(&self, recipient: &str, proxy: Option<&str>) -> FaucetResponse {
        let client = match self.client_for(proxy) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Falling back to direct faucet request");
                self.client.clone()
            }
        };

        let response = client
            .post(&self.url)
            .json(&json!({ "FixedAmountRequest": { "recipient": recipient } }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return FaucetResponse::Rejected(e.to_string()),
        };
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let outcome = classify_response(status, &body);
        debug!(status, outcome = ?outcome, "Faucet responded");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        let body = r#"{"status":"Success","coins_sent":[{"amount":1000000000}]}"#;
        assert_eq!(classify_response(200, body), FaucetResponse::Funded);
        assert!(classify_response(200, "{}").is_funded());
    }

    #[test]
    fn test_classify_embedded_failure() {
        let body = r#"{"status":{"Failure":{"Internal":"Faucet is busy"}}}"#;
        assert_eq!(
            classify_response(200, body),
            FaucetResponse::Rejected("Faucet is busy".into())
        );

        let bare = r#"{"status":{"Failure":{}}}"#;
        assert_eq!(
            classify_response(200, bare),
            FaucetResponse::Rejected("Error".into())
        );
    }

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(classify_response(429, ""), FaucetResponse::RateLimited);
        assert_eq!(
            classify_response(500, "oops"),
            FaucetResponse::Rejected("Status 500".into())
        );
        assert_eq!(
            classify_response(200, "<html>"),
            FaucetResponse::Rejected("Invalid JSON".into())
        );
    }

    #[test]
    fn test_proxy_clients_are_reused() {
        let faucet = FaucetClient::new(DEFAULT_FAUCET_URL).unwrap();
        faucet.client_for(Some("http://127.0.0.1:8080")).unwrap();
        faucet.client_for(Some("http://127.0.0.1:8080")).unwrap();
        faucet.client_for(None).unwrap();
        assert_eq!(faucet.proxied.len(), 1);
    }
}
