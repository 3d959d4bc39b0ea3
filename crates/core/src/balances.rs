//! Wallet balance snapshots.

use creek_chain::ChainClient;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::{CoinTypes, Token};

/// Balances of every tracked token at one point in time, in base units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletBalances {
    amounts: BTreeMap<Token, u64>,
}

impl WalletBalances {
    /// Read every tracked token for `address`.
    ///
    /// SUI comes from the balance endpoint, everything else from summed
    /// coins. A failed read is logged and counted as zero.
    pub async fn snapshot(chain: &dyn ChainClient, types: &CoinTypes, address: &str) -> Self {
        let mut amounts = BTreeMap::new();
        for token in Token::TRACKED {
            let read = if token.is_native() {
                chain.get_balance(address).await
            } else {
                chain
                    .get_coins(address, token.coin_type(types))
                    .await
                    .map(|coins| {
                        coins
                            .iter()
                            .fold(0u64, |acc, c| acc.saturating_add(c.balance))
                    })
            };
            let amount = read.unwrap_or_else(|e| {
                warn!(token = %token, error = %e, "Balance read failed, counting as zero");
                0
            });
            amounts.insert(token, amount);
        }
        Self { amounts }
    }

    pub fn get(&self, token: Token) -> u64 {
        self.amounts.get(&token).copied().unwrap_or(0)
    }

    pub fn set(&mut self, token: Token, amount: u64) {
        self.amounts.insert(token, amount);
    }

    /// Signed change per token from `earlier` to `self`.
    pub fn deltas(&self, earlier: &WalletBalances) -> Vec<(Token, i128)> {
        Token::TRACKED
            .iter()
            .map(|t| (*t, self.get(*t) as i128 - earlier.get(*t) as i128))
            .collect()
    }

    /// Log one line per token in whole units.
    pub fn log(&self, label: &str, decimals: u64) {
        for token in Token::TRACKED {
            info!(
                snapshot = label,
                token = %token,
                amount = self.get(token) as f64 / decimals as f64,
                "Balance"
            );
        }
    }

    /// Log per-token changes since `before`.
    pub fn log_deltas(&self, before: &WalletBalances, decimals: u64) {
        for (token, delta) in self.deltas(before) {
            info!(
                token = %token,
                before = before.get(token) as f64 / decimals as f64,
                after = self.get(token) as f64 / decimals as f64,
                change = delta as f64 / decimals as f64,
                "Balance change"
            );
        }
    }
}
