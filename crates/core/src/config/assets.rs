//! Token identities, deposit policies and reference prices.

use creek_chain::PriceFeed;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::protocol::CoinTypes;

/// Tokens the bot handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    Gr,
    Sui,
    Usdc,
    Gusd,
    Xaum,
    Gy,
}

impl Token {
    /// Tokens captured in balance snapshots.
    pub const TRACKED: [Token; 5] = [Token::Gr, Token::Sui, Token::Usdc, Token::Gusd, Token::Xaum];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gr => "GR",
            Self::Sui => "SUI",
            Self::Usdc => "USDC",
            Self::Gusd => "GUSD",
            Self::Xaum => "XAUM",
            Self::Gy => "GY",
        }
    }

    pub fn coin_type<'a>(&self, types: &'a CoinTypes) -> &'a str {
        match self {
            Self::Gr => &types.gr,
            Self::Sui => &types.sui,
            Self::Usdc => &types.usdc,
            Self::Gusd => &types.gusd,
            Self::Xaum => &types.xaum,
            Self::Gy => &types.gy,
        }
    }

    /// Native gas token, read through the balance endpoint instead of coins.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Sui)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Two-bound spend policy for collateral deposits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositPolicy {
    /// Maximum fraction of the balance to deposit
    pub deposit_pct: f64,
    /// Base units that must stay in the wallet
    pub min_reserve: u64,
}

impl DepositPolicy {
    pub const fn new(deposit_pct: f64, min_reserve: u64) -> Self {
        Self {
            deposit_pct,
            min_reserve,
        }
    }

    /// `max(0, floor(min(balance * pct, balance - reserve)))`
    pub fn safe_amount(&self, balance: u64) -> u64 {
        let by_pct = balance as f64 * self.deposit_pct;
        let with_reserve = balance as f64 - self.min_reserve as f64;
        let safe = by_pct.min(with_reserve).floor();
        if safe <= 0.0 {
            0
        } else {
            (safe as u64).min(balance)
        }
    }
}

/// Reference price of one token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetPrice {
    pub token: Token,
    pub price: f64,
}

/// Per-token policies and prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_gr_policy")]
    pub gr: DepositPolicy,

    #[serde(default = "default_sui_policy")]
    pub sui: DepositPolicy,

    #[serde(default = "default_usdc_policy")]
    pub usdc: DepositPolicy,

    /// Prices published before borrow and withdraw, in bundle order
    #[serde(default = "default_prices")]
    pub prices: Vec<AssetPrice>,

    /// Tokens counted as collateral by the health guard
    #[serde(default = "default_collateral")]
    pub collateral: Vec<Token>,

    /// Token counted as debt by the health guard
    #[serde(default = "default_borrow_asset")]
    pub borrow_asset: Token,
}

fn default_gr_policy() -> DepositPolicy {
    DepositPolicy::new(0.70, 50_000_000_000)
}
fn default_sui_policy() -> DepositPolicy {
    DepositPolicy::new(0.50, 1_000_000_000)
}
fn default_usdc_policy() -> DepositPolicy {
    DepositPolicy::new(0.80, 5_000_000_000)
}
fn default_prices() -> Vec<AssetPrice> {
    vec![
        AssetPrice { token: Token::Gr, price: 150.5 },
        AssetPrice { token: Token::Sui, price: 3.18 },
        AssetPrice { token: Token::Usdc, price: 1.0 },
        AssetPrice { token: Token::Gusd, price: 1.05 },
    ]
}
fn default_collateral() -> Vec<Token> {
    vec![Token::Gr, Token::Usdc]
}
fn default_borrow_asset() -> Token {
    Token::Gusd
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            gr: default_gr_policy(),
            sui: default_sui_policy(),
            usdc: default_usdc_policy(),
            prices: default_prices(),
            collateral: default_collateral(),
            borrow_asset: default_borrow_asset(),
        }
    }
}

impl AssetsConfig {
    /// Configured price for `token`, zero if unpriced.
    pub fn price_of(&self, token: Token) -> f64 {
        self.prices
            .iter()
            .find(|p| p.token == token)
            .map(|p| p.price)
            .unwrap_or(0.0)
    }

    /// Feeds for the price bundler, in configured order.
    pub fn price_feeds(&self, types: &CoinTypes) -> Vec<PriceFeed> {
        self.prices
            .iter()
            .map(|p| PriceFeed::from_price(p.token.coin_type(types), p.price))
            .collect()
    }
}
