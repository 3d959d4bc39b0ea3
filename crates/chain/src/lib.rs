//! Creek chain interaction layer.
//!
//! This crate provides:
//! - Programmable transaction model and builder
//! - Execution result decoding (status, events, object changes)
//! - Sui JSON-RPC client for balances, coin listing and execution
//! - Signing abstraction with a sidecar-backed implementation
//! - Oracle price-refresh bundling for lending calls

mod client;
mod effects;
mod oracle;
mod provider;
mod signer;
mod transaction;

pub use client::{ChainClient, ChainError, CoinObjectRef};
pub use effects::{
    struct_name, ExecutionStatus, ObjectChange, ObjectChangeKind, TransactionEvent,
    TransactionResult,
};
pub use oracle::{OracleObjects, PriceBundler, PriceFeed};
pub use provider::{SuiRpcClient, DEFAULT_RPC_URL};
pub use signer::{
    SidecarSigner, SidecarSignerFactory, SignedTransaction, SignerFactory, TransactionSigner,
};
pub use transaction::{
    Argument, Command, MoveCall, ObjectId, TransactionBuilder, TransactionRequest,
};
