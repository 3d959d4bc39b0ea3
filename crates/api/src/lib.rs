//! Creek external HTTP services.
//!
//! This crate provides:
//! - Sui testnet faucet client with per-wallet proxy routing

mod faucet;

pub use faucet::{classify_response, FaucetApi, FaucetClient, FaucetError, FaucetResponse, DEFAULT_FAUCET_URL};
