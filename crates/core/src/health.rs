//! Health factor estimation from wallet balances.
//!
//! Advisory only: the report is produced after a wallet's sequence and
//! logged. Nothing here blocks an action.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::balances::WalletBalances;
use crate::config::{AssetsConfig, BotConfig, HealthConfig, Token};

/// `collateral / borrow`, infinite when nothing is borrowed.
pub fn health_factor(collateral_value: f64, borrow_value: f64) -> f64 {
    if borrow_value <= 0.0 {
        f64::INFINITY
    } else {
        collateral_value / borrow_value
    }
}

/// Risk classification of a health factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskTier {
    Critical,
    Warning,
    Safe,
    VerySafe,
}

impl RiskTier {
    pub fn from_health_factor(hf: f64, thresholds: &HealthConfig) -> Self {
        if hf < thresholds.critical_below {
            Self::Critical
        } else if hf < thresholds.warning_below {
            Self::Warning
        } else if hf < thresholds.safe_below {
            Self::Safe
        } else {
            Self::VerySafe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Safe => "safe",
            Self::VerySafe => "very_safe",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Valued position of one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthReport {
    /// Sum of collateral balances times price, in whole-token units
    pub collateral_value: f64,
    pub borrow_value: f64,
    pub health_factor: f64,
    pub tier: RiskTier,
}

/// Values balances at configured prices and classifies the result.
#[derive(Debug, Clone)]
pub struct HealthFactorGuard {
    assets: AssetsConfig,
    thresholds: HealthConfig,
    decimals: f64,
}

impl HealthFactorGuard {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            assets: config.assets.clone(),
            thresholds: config.health.clone(),
            decimals: config.decimals as f64,
        }
    }

    fn value(&self, balances: &WalletBalances, token: Token) -> f64 {
        balances.get(token) as f64 / self.decimals * self.assets.price_of(token)
    }

    /// Build a report from a balance snapshot.
    pub fn assess(&self, balances: &WalletBalances) -> HealthReport {
        let collateral_value: f64 = self
            .assets
            .collateral
            .iter()
            .map(|t| self.value(balances, *t))
            .sum();
        let borrow_value = self.value(balances, self.assets.borrow_asset);
        let hf = health_factor(collateral_value, borrow_value);

        HealthReport {
            collateral_value,
            borrow_value,
            health_factor: hf,
            tier: RiskTier::from_health_factor(hf, &self.thresholds),
        }
    }

    /// Assess and log. A critical tier is logged as a warning.
    pub fn check(&self, address: &str, balances: &WalletBalances) -> HealthReport {
        let report = self.assess(balances);
        if report.tier == RiskTier::Critical {
            warn!(
                address = %address,
                health_factor = report.health_factor,
                collateral = report.collateral_value,
                borrowed = report.borrow_value,
                "Health factor critical"
            );
        } else {
            info!(
                address = %address,
                health_factor = report.health_factor,
                tier = %report.tier,
                "Health factor"
            );
        }
        report
    }
}
