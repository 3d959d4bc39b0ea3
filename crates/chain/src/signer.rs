//! Transaction signing.
//!
//! Key decoding and transaction byte encoding live outside this workspace.
//! [`SidecarSigner`] hands both to a local signing service and only keeps the
//! derived address; anything else implementing [`TransactionSigner`] can take
//! its place.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::client::ChainError;
use crate::transaction::TransactionRequest;

/// Encoded transaction plus its signature, ready for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Base64 BCS transaction bytes
    pub tx_bytes: String,
    /// Base64 serialized signature
    pub signature: String,
}

/// Signing capability for one wallet.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address derived from the signing key.
    fn address(&self) -> &str;

    /// Encode and sign `request` with this wallet as sender.
    async fn sign(&self, request: &TransactionRequest) -> Result<SignedTransaction, ChainError>;
}

/// Produces a signer from one line of the key source.
#[async_trait]
pub trait SignerFactory: Send + Sync {
    async fn signer_for(&self, secret_key: &str) -> Result<Box<dyn TransactionSigner>, ChainError>;
}

#[derive(Serialize)]
struct DeriveRequest<'a> {
    secret_key: &'a str,
}

#[derive(Deserialize)]
struct DeriveResponse {
    address: String,
}

#[derive(Serialize)]
struct SignRequest<'a> {
    secret_key: &'a str,
    sender: &'a str,
    transaction: &'a TransactionRequest,
}

/// Signer backed by a local signing service.
///
/// `POST /derive` resolves the address once at construction; every
/// transaction goes through `POST /sign`.
pub struct SidecarSigner {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
    address: String,
}

impl fmt::Debug for SidecarSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidecarSigner")
            .field("base_url", &self.base_url)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl SidecarSigner {
    /// Resolve the wallet address for `secret_key` and build a signer.
    pub async fn connect(
        client: reqwest::Client,
        base_url: &str,
        secret_key: &str,
    ) -> Result<Self, ChainError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let response = client
            .post(format!("{}/derive", base_url))
            .json(&DeriveRequest { secret_key })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        let derived: DeriveResponse = response.json().await?;

        debug!(address = %derived.address, "Derived wallet address");

        Ok(Self {
            client,
            base_url,
            secret_key: secret_key.to_string(),
            address: derived.address,
        })
    }
}

#[async_trait]
impl TransactionSigner for SidecarSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, request: &TransactionRequest) -> Result<SignedTransaction, ChainError> {
        let response = self
            .client
            .post(format!("{}/sign", self.base_url))
            .json(&SignRequest {
                secret_key: &self.secret_key,
                sender: &self.address,
                transaction: request,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        Ok(response.json().await?)
    }
}

/// [`SignerFactory`] producing [`SidecarSigner`]s against one service.
#[derive(Debug, Clone)]
pub struct SidecarSignerFactory {
    client: reqwest::Client,
    base_url: String,
}

impl SidecarSignerFactory {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let base_url = base_url.into();
        info!(url = %base_url, "Signing service configured");
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl SignerFactory for SidecarSignerFactory {
    async fn signer_for(&self, secret_key: &str) -> Result<Box<dyn TransactionSigner>, ChainError> {
        let signer = SidecarSigner::connect(self.client.clone(), &self.base_url, secret_key).await?;
        Ok(Box::new(signer))
    }
}
