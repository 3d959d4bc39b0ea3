//! Creek Finance bot core logic.
//!
//! This crate provides the wallet automation functionality:
//! - Configuration profiles, protocol topology and asset policies
//! - Coin selection with bounded retries and merge-then-split payments
//! - Transaction builders for every action kind
//! - Obligation tracking with event and object-change extraction
//! - Execution with status-based outcome classification
//! - Faucet funding gate, advisory health factor guard
//! - Per-wallet pipeline and the daily scheduler
//!
//! Wallets and actions run strictly sequentially; shared protocol objects
//! are never targeted by two in-flight transactions.

pub mod actions;
mod balances;
mod coin_selector;
pub mod config;
mod error;
mod executor;
mod faucet_gate;
mod health;
mod keys;
mod obligation;
mod pipeline;
mod scheduler;
mod stats;
mod timing;

#[cfg(test)]
mod testing;

pub use actions::{ActionBuilder, ActionKind, BuiltAction};
pub use balances::WalletBalances;
pub use coin_selector::{CoinSelection, CoinSelector};
pub use config::{BotConfig, ProtocolConfig, Token};
pub use error::{ActionError, ActionResult, PreconditionError};
pub use executor::TransactionExecutor;
pub use faucet_gate::{FaucetGate, GateOutcome, GateState};
pub use health::{health_factor, HealthFactorGuard, HealthReport, RiskTier};
pub use keys::{parse_keys, KeySource, ProxyMap, ProxySource, SecretKey};
pub use obligation::{Obligation, ObligationExtractor, ObligationTracker, ResourceExtractor};
pub use pipeline::{
    default_plan, PipelineStep, Requirement, WalletIdentity, WalletPipeline, WalletReport,
};
pub use scheduler::Scheduler;
pub use stats::{ActionTally, DailyStats, WalletStats};
