//! Chain RPC boundary.
//!
//! Everything the orchestration core needs from the chain goes through
//! [`ChainClient`], so tests can substitute an in-memory implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::TransactionResult;
use crate::signer::TransactionSigner;
use crate::transaction::{ObjectId, TransactionRequest};

/// One spendable unit of a token owned by an address.
///
/// Fetched fresh per action; invalid once a submitted transaction consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinObjectRef {
    pub id: ObjectId,
    pub balance: u64,
}

/// Errors raised at the RPC boundary.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rate limited by endpoint")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

impl ChainError {
    /// Whether backing off and retrying may help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Network(_))
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        if err.status().map(|s| s.as_u16()) == Some(429) {
            Self::RateLimited
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Operations consumed from the chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native (gas token) balance of `address`, in base units.
    async fn get_balance(&self, address: &str) -> Result<u64, ChainError>;

    /// All coin objects of `coin_type` owned by `address`.
    async fn get_coins(
        &self,
        address: &str,
        coin_type: &str,
    ) -> Result<Vec<CoinObjectRef>, ChainError>;

    /// Sign `request` with `signer` and execute it.
    ///
    /// An `Ok` result may still carry a failed execution status.
    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
        signer: &dyn TransactionSigner,
    ) -> Result<TransactionResult, ChainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ChainError::RateLimited.is_transient());
        assert!(ChainError::Network("reset".into()).is_transient());
        assert!(!ChainError::Decode("bad".into()).is_transient());
        assert!(!ChainError::Rpc {
            code: -32602,
            message: "invalid params".into()
        }
        .is_transient());
    }
}
