//! Configuration for the Creek Finance bot.
//!
//! This module provides:
//! - Bot runtime configuration (profiles, counts, timing, retries, amounts)
//! - Protocol configuration (package ids, shared objects, coin types)
//! - Asset configuration (deposit policies, reference prices)

mod assets;
mod bot;
mod protocol;

pub use bot::{
    ActionCounts, AmountConfig, AmountRange, BotConfig, DelayRange, FaucetGateConfig,
    HealthConfig, RetryConfig, TimingConfig,
};

pub use protocol::{CoinTypes, ProtocolConfig};

pub use assets::{AssetPrice, AssetsConfig, DepositPolicy, Token};
