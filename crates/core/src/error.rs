//! Error taxonomy for action execution.
//!
//! Every action error is caught at the action boundary and turned into a
//! tallied failure. Only [`ActionError::Config`] stops the process.

use creek_chain::ChainError;
use thiserror::Error;

use crate::config::Token;

/// Conditions checked before any transaction is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no obligation exists for this wallet")]
    MissingObligation,

    #[error("obligation {0} has no known key")]
    MissingObligationKey(String),

    #[error("computed {token} amount is zero")]
    AmountTooSmall { token: Token },

    #[error("{token} balance {available} is below required {required}")]
    InsufficientBalance {
        token: Token,
        required: u64,
        available: u64,
    },
}

/// Failure of a single action or of the run itself.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No usable configuration or keys.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// No coins of the requested type after every fetch attempt.
    #[error("no {token} coins found after {attempts} attempts")]
    ResourceNotFound { token: Token, attempts: u32 },

    #[error("rate limited")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    /// Well-formed submission that executed with a failure status.
    #[error("execution failed ({digest}): {reason}")]
    OnChainExecution { digest: String, reason: String },
}

impl ActionError {
    /// Whether this error must stop the whole process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Short class label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Precondition(_) => "precondition",
            Self::ResourceNotFound { .. } => "resource_not_found",
            Self::RateLimited => "rate_limited",
            Self::Network(_) => "network",
            Self::OnChainExecution { .. } => "on_chain_execution",
        }
    }
}

impl From<ChainError> for ActionError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::RateLimited => Self::RateLimited,
            other => Self::Network(other.to_string()),
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
