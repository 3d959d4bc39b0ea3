//! Configuration management with profile support.
//!
//! Provides the bot's runtime parameters (repetition counts, delays,
//! retry limits, amounts) with support for different profiles
//! (default, quick). The resolved value is immutable and passed explicitly
//! into every component.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::assets::AssetsConfig;
use super::protocol::ProtocolConfig;

/// Main configuration structure containing all bot parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// Gas budget attached to every transaction
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,

    /// Base units per whole token (all tokens share 9 decimals)
    #[serde(default = "default_decimals")]
    pub decimals: u64,

    /// Repetitions per action
    #[serde(default)]
    pub counts: ActionCounts,

    /// Delays and cycle length
    #[serde(default)]
    pub timing: TimingConfig,

    /// Retry limits
    #[serde(default)]
    pub retry: RetryConfig,

    /// Action amounts
    #[serde(default)]
    pub amounts: AmountConfig,

    /// Native balance gate
    #[serde(default)]
    pub faucet: FaucetGateConfig,

    /// Health classification thresholds
    #[serde(default)]
    pub health: HealthConfig,

    /// On-chain topology
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Deposit policies and prices
    #[serde(default)]
    pub assets: AssetsConfig,
}

fn default_profile_name() -> String {
    "default".to_string()
}
fn default_gas_budget() -> u64 {
    200_000_000
}
fn default_decimals() -> u64 {
    1_000_000_000
}

/// Inclusive range of whole seconds, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayRange {
    pub const fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn sample(&self) -> Duration {
        if self.max_secs <= self.min_secs {
            return Duration::from_secs(self.min_secs);
        }
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

/// Range of whole-token amounts, sampled uniformly and floored to base units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, decimals: u64) -> u64 {
        let tokens = if self.max <= self.min {
            self.min
        } else {
            rand::thread_rng().gen_range(self.min..self.max)
        };
        (tokens * decimals as f64).floor().max(0.0) as u64
    }

    /// Largest value `sample` can return.
    pub fn upper_bound(&self, decimals: u64) -> u64 {
        (self.max.max(self.min) * decimals as f64).floor().max(0.0) as u64
    }
}

/// Repetitions per action kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCounts {
    #[serde(default = "default_three")]
    pub xaum_claims: u32,
    #[serde(default = "default_three")]
    pub usdc_claims: u32,
    #[serde(default = "default_three")]
    pub usdc_to_gusd: u32,
    #[serde(default = "default_one")]
    pub gusd_to_usdc: u32,
    #[serde(default = "default_three")]
    pub stakes: u32,
    #[serde(default = "default_three")]
    pub redeems: u32,
    #[serde(default = "default_three")]
    pub gr_deposits: u32,
    #[serde(default = "default_three")]
    pub sui_deposits: u32,
    #[serde(default = "default_three")]
    pub usdc_deposits: u32,
    #[serde(default = "default_three")]
    pub borrows: u32,
    #[serde(default = "default_three")]
    pub repays: u32,
    #[serde(default = "default_three")]
    pub withdraws: u32,
}

fn default_three() -> u32 {
    3
}
fn default_one() -> u32 {
    1
}

impl Default for ActionCounts {
    fn default() -> Self {
        Self {
            xaum_claims: 3,
            usdc_claims: 3,
            usdc_to_gusd: 3,
            gusd_to_usdc: 1,
            stakes: 3,
            redeems: 3,
            gr_deposits: 3,
            sui_deposits: 3,
            usdc_deposits: 3,
            borrows: 3,
            repays: 3,
            withdraws: 3,
        }
    }
}

/// Delay ranges and cycle length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause after every successful transaction
    #[serde(default = "default_post_success")]
    pub post_success_cooldown: DelayRange,

    /// Pause before each coin fetch attempt
    #[serde(default = "default_coin_retry")]
    pub coin_retry_delay: DelayRange,

    /// Backoff after a rate-limited faucet response
    #[serde(default = "default_faucet_rate_limit")]
    pub faucet_rate_limit_backoff: DelayRange,

    /// Backoff after any other faucet failure
    #[serde(default = "default_faucet_failure")]
    pub faucet_failure_backoff: DelayRange,

    /// Wait before re-reading balance after a funded faucet response (seconds)
    #[serde(default = "default_faucet_recheck")]
    pub faucet_recheck_secs: u64,

    /// Pause between wallets
    #[serde(default = "default_inter_wallet")]
    pub inter_wallet_delay: DelayRange,

    /// Cycle length measured from cycle start (seconds)
    #[serde(default = "default_cycle_length")]
    pub cycle_length_secs: u64,
}

fn default_post_success() -> DelayRange {
    DelayRange::new(10, 15)
}
fn default_coin_retry() -> DelayRange {
    DelayRange::new(10, 15)
}
fn default_faucet_rate_limit() -> DelayRange {
    DelayRange::new(3, 10)
}
fn default_faucet_failure() -> DelayRange {
    DelayRange::new(2, 6)
}
fn default_faucet_recheck() -> u64 {
    3
}
fn default_inter_wallet() -> DelayRange {
    DelayRange::new(30, 60)
}
fn default_cycle_length() -> u64 {
    24 * 60 * 60
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            post_success_cooldown: default_post_success(),
            coin_retry_delay: default_coin_retry(),
            faucet_rate_limit_backoff: default_faucet_rate_limit(),
            faucet_failure_backoff: default_faucet_failure(),
            faucet_recheck_secs: default_faucet_recheck(),
            inter_wallet_delay: default_inter_wallet(),
            cycle_length_secs: default_cycle_length(),
        }
    }
}

impl TimingConfig {
    pub fn faucet_recheck(&self) -> Duration {
        Duration::from_secs(self.faucet_recheck_secs)
    }
    pub fn cycle_length(&self) -> Duration {
        Duration::from_secs(self.cycle_length_secs)
    }
}

/// Retry limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Coin fetch attempts before giving up
    #[serde(default = "default_coin_fetch_retries")]
    pub coin_fetch_retries: u32,

    /// Faucet attempts before the gate is exhausted
    #[serde(default = "default_faucet_attempts")]
    pub faucet_attempts: u32,

    /// Wait after a rate-limited coin fetch (seconds)
    #[serde(default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown_secs: u64,
}

fn default_coin_fetch_retries() -> u32 {
    5
}
fn default_faucet_attempts() -> u32 {
    50
}
fn default_rate_limit_cooldown() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            coin_fetch_retries: default_coin_fetch_retries(),
            faucet_attempts: default_faucet_attempts(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown(),
        }
    }
}

impl RetryConfig {
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }
}

/// Amounts per action, in base units unless noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountConfig {
    #[serde(default = "default_xaum_claim")]
    pub xaum_claim: u64,

    #[serde(default = "default_usdc_claim")]
    pub usdc_claim: u64,

    /// USDC swapped into GUSD (whole tokens)
    #[serde(default = "default_usdc_to_gusd")]
    pub usdc_to_gusd: AmountRange,

    /// GUSD redeemed into USDC (whole tokens)
    #[serde(default = "default_gusd_to_usdc")]
    pub gusd_to_usdc: AmountRange,

    /// XAUM staked (whole tokens)
    #[serde(default = "default_stake")]
    pub stake: AmountRange,

    /// Base redeem amount (whole tokens), scaled by `redeem_ratio`
    #[serde(default = "default_redeem")]
    pub redeem: AmountRange,

    /// Multiplier applied to the redeem amount for both GR and GY
    #[serde(default = "default_redeem_ratio")]
    pub redeem_ratio: u64,

    /// Random cap on each SUI deposit (whole tokens)
    #[serde(default = "default_sui_deposit_cap")]
    pub sui_deposit_cap: AmountRange,

    #[serde(default = "default_borrow")]
    pub borrow: u64,

    /// Fraction of the GUSD balance to repay
    #[serde(default = "default_repay_fraction")]
    pub repay_fraction: f64,

    /// Upper bound on a single repayment
    #[serde(default = "default_repay_cap")]
    pub repay_cap: u64,

    /// Raw GR withdrawn per withdrawal
    #[serde(default = "default_withdraw")]
    pub withdraw: u64,
}

fn default_xaum_claim() -> u64 {
    1_000_000_000
}
fn default_usdc_claim() -> u64 {
    10_000_000_000
}
fn default_usdc_to_gusd() -> AmountRange {
    AmountRange::new(1.0, 10.0)
}
fn default_gusd_to_usdc() -> AmountRange {
    AmountRange::new(1.0, 3.0)
}
fn default_stake() -> AmountRange {
    AmountRange::new(1.0, 3.0)
}
fn default_redeem() -> AmountRange {
    AmountRange::new(0.1, 1.0)
}
fn default_redeem_ratio() -> u64 {
    100
}
fn default_sui_deposit_cap() -> AmountRange {
    AmountRange::new(0.1, 0.5)
}
fn default_borrow() -> u64 {
    50_000_000_000
}
fn default_repay_fraction() -> f64 {
    0.5
}
fn default_repay_cap() -> u64 {
    10_000_000_000
}
fn default_withdraw() -> u64 {
    1_000_000
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            xaum_claim: default_xaum_claim(),
            usdc_claim: default_usdc_claim(),
            usdc_to_gusd: default_usdc_to_gusd(),
            gusd_to_usdc: default_gusd_to_usdc(),
            stake: default_stake(),
            redeem: default_redeem(),
            redeem_ratio: default_redeem_ratio(),
            sui_deposit_cap: default_sui_deposit_cap(),
            borrow: default_borrow(),
            repay_fraction: default_repay_fraction(),
            repay_cap: default_repay_cap(),
            withdraw: default_withdraw(),
        }
    }
}

impl AmountConfig {
    /// `min(floor(balance * fraction), cap)`
    pub fn repay_amount(&self, balance: u64) -> u64 {
        let half = (balance as f64 * self.repay_fraction).floor().max(0.0) as u64;
        half.min(self.repay_cap)
    }
}

/// Native balance required before any action runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetGateConfig {
    /// Minimum native balance (base units)
    #[serde(default = "default_min_native_balance")]
    pub min_native_balance: u64,
}

fn default_min_native_balance() -> u64 {
    1_000_000_000
}

impl Default for FaucetGateConfig {
    fn default() -> Self {
        Self {
            min_native_balance: default_min_native_balance(),
        }
    }
}

/// Health factor tier boundaries (each is an exclusive upper bound).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_critical_hf")]
    pub critical_below: f64,
    #[serde(default = "default_warning_hf")]
    pub warning_below: f64,
    #[serde(default = "default_safe_hf")]
    pub safe_below: f64,
}

fn default_critical_hf() -> f64 {
    1.5
}
fn default_warning_hf() -> f64 {
    2.0
}
fn default_safe_hf() -> f64 {
    10.0
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            critical_below: default_critical_hf(),
            warning_below: default_warning_hf(),
            safe_below: default_safe_hf(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            gas_budget: default_gas_budget(),
            decimals: default_decimals(),
            counts: ActionCounts::default(),
            timing: TimingConfig::default(),
            retry: RetryConfig::default(),
            amounts: AmountConfig::default(),
            faucet: FaucetGateConfig::default(),
            health: HealthConfig::default(),
            protocol: ProtocolConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Short delays and a one-hour cycle for smoke runs.
    pub fn quick() -> Self {
        Self {
            profile: "quick".to_string(),
            timing: TimingConfig {
                post_success_cooldown: DelayRange::new(1, 2),
                coin_retry_delay: DelayRange::new(1, 2),
                faucet_rate_limit_backoff: DelayRange::new(2, 4),
                faucet_failure_backoff: DelayRange::new(1, 2),
                faucet_recheck_secs: 2,
                inter_wallet_delay: DelayRange::new(3, 5),
                cycle_length_secs: 60 * 60,
            },
            retry: RetryConfig {
                coin_fetch_retries: 3,
                faucet_attempts: 10,
                rate_limit_cooldown_secs: 10,
            },
            ..Self::default()
        }
    }

    /// Resolve configuration from the environment.
    ///
    /// `BOT_CONFIG` names a TOML file and wins when set; otherwise
    /// `BOT_PROFILE` picks a built-in profile (default, quick).
    pub fn from_env() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var("BOT_CONFIG") {
            return Self::from_file(&path);
        }
        let profile = std::env::var("BOT_PROFILE").unwrap_or_else(|_| "default".to_string());
        Ok(match profile.to_lowercase().as_str() {
            "quick" | "fast" => Self::quick(),
            _ => Self::default(),
        })
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(
            profile = %self.profile,
            gas_budget = self.gas_budget,
            "Bot configuration loaded"
        );
        tracing::info!(
            xaum_claims = self.counts.xaum_claims,
            usdc_claims = self.counts.usdc_claims,
            usdc_to_gusd = self.counts.usdc_to_gusd,
            gusd_to_usdc = self.counts.gusd_to_usdc,
            stakes = self.counts.stakes,
            redeems = self.counts.redeems,
            gr_deposits = self.counts.gr_deposits,
            sui_deposits = self.counts.sui_deposits,
            usdc_deposits = self.counts.usdc_deposits,
            borrows = self.counts.borrows,
            repays = self.counts.repays,
            withdraws = self.counts.withdraws,
            "Action counts"
        );
        tracing::info!(
            cooldown = ?self.timing.post_success_cooldown,
            inter_wallet = ?self.timing.inter_wallet_delay,
            cycle_secs = self.timing.cycle_length_secs,
            "Timing"
        );
        tracing::info!(
            coin_fetch_retries = self.retry.coin_fetch_retries,
            faucet_attempts = self.retry.faucet_attempts,
            rate_limit_cooldown_secs = self.retry.rate_limit_cooldown_secs,
            min_native_balance = self.faucet.min_native_balance,
            "Retry limits"
        );
        tracing::info!(
            borrow = self.amounts.borrow,
            repay_cap = self.amounts.repay_cap,
            withdraw = self.amounts.withdraw,
            "Lending amounts"
        );
    }
}
