//! Coin selection: fetch, merge, and size a payment.
//!
//! The first fetched coin is the merge target; every other coin of the same
//! type is merged into it before the payment is split off, so a split never
//! asks for more than the summed balance of the set.

use creek_chain::{Argument, ChainClient, ChainError, CoinObjectRef, TransactionBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{BotConfig, CoinTypes, DelayRange, DepositPolicy, Token};
use crate::error::{ActionError, ActionResult, PreconditionError};
use crate::timing::{pause, pause_for};

/// Non-empty set of coins of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    token: Token,
    coins: Vec<CoinObjectRef>,
    total: u64,
}

impl CoinSelection {
    /// `None` when `coins` is empty.
    pub fn new(token: Token, coins: Vec<CoinObjectRef>) -> Option<Self> {
        if coins.is_empty() {
            return None;
        }
        let total = coins.iter().fold(0u64, |acc, c| acc.saturating_add(c.balance));
        Some(Self {
            token,
            coins,
            total,
        })
    }

    pub fn token(&self) -> Token {
        self.token
    }

    /// Summed balance of every coin in the set.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Fail unless the set covers `amount`.
    pub fn require(&self, amount: u64) -> Result<(), PreconditionError> {
        if self.total < amount {
            return Err(PreconditionError::InsufficientBalance {
                token: self.token,
                required: amount,
                available: self.total,
            });
        }
        Ok(())
    }

    /// Merge every coin into the first and return the merged coin.
    pub fn merge_into(&self, tx: &mut TransactionBuilder) -> Argument {
        let primary = Argument::object(&self.coins[0].id);
        let rest = self.coins[1..]
            .iter()
            .map(|c| Argument::object(&c.id))
            .collect();
        tx.merge_coins(primary.clone(), rest);
        primary
    }

    /// Merge, then split off exactly `amount`.
    pub fn split_exact(&self, tx: &mut TransactionBuilder, amount: u64) -> Argument {
        let merged = self.merge_into(tx);
        tx.split_coin(merged, amount)
    }
}

/// Fetches coins with bounded retries.
pub struct CoinSelector {
    chain: Arc<dyn ChainClient>,
    coin_types: CoinTypes,
    retries: u32,
    retry_delay: DelayRange,
    rate_limit_cooldown: Duration,
}

impl CoinSelector {
    pub fn new(chain: Arc<dyn ChainClient>, config: &BotConfig) -> Self {
        Self {
            chain,
            coin_types: config.protocol.coin_types.clone(),
            retries: config.retry.coin_fetch_retries,
            retry_delay: config.timing.coin_retry_delay,
            rate_limit_cooldown: config.retry.rate_limit_cooldown(),
        }
    }

    /// Fetch every coin of `token` owned by `address`.
    ///
    /// Each attempt waits a randomized delay first. A rate-limited attempt
    /// additionally waits the fixed cooldown. A non-transient error is
    /// returned at once. Returns `ResourceNotFound` if any attempt came back
    /// empty, otherwise the last transport error.
    pub async fn fetch(&self, address: &str, token: Token) -> ActionResult<CoinSelection> {
        let coin_type = token.coin_type(&self.coin_types);
        let mut saw_empty = false;
        let mut last_error: Option<ChainError> = None;

        for attempt in 1..=self.retries {
            pause(self.retry_delay, "coin fetch").await;

            match self.chain.get_coins(address, coin_type).await {
                Ok(coins) => match CoinSelection::new(token, coins) {
                    Some(selection) => {
                        debug!(
                            token = %token,
                            coins = selection.len(),
                            total = selection.total(),
                            attempt,
                            "Coins selected"
                        );
                        return Ok(selection);
                    }
                    None => {
                        saw_empty = true;
                        debug!(token = %token, attempt, retries = self.retries, "No coins yet");
                    }
                },
                Err(ChainError::RateLimited) => {
                    warn!(token = %token, attempt, "Coin fetch rate limited, cooling down");
                    pause_for(self.rate_limit_cooldown, "rate limit cooldown").await;
                    last_error = Some(ChainError::RateLimited);
                }
                Err(e) if e.is_transient() => {
                    warn!(token = %token, attempt, error = %e, "Coin fetch failed");
                    last_error = Some(e);
                }
                Err(e) => {
                    warn!(token = %token, attempt, error = %e, "Coin fetch failed permanently");
                    return Err(e.into());
                }
            }
        }

        match last_error {
            Some(e) if !saw_empty => Err(e.into()),
            _ => Err(ActionError::ResourceNotFound {
                token,
                attempts: self.retries,
            }),
        }
    }

    /// Fetch coins covering exactly `amount`.
    pub async fn select_exact(
        &self,
        address: &str,
        token: Token,
        amount: u64,
    ) -> ActionResult<CoinSelection> {
        let selection = self.fetch(address, token).await?;
        selection.require(amount)?;
        Ok(selection)
    }

    /// Fetch coins and size a deposit under `policy`.
    pub async fn select_safe(
        &self,
        address: &str,
        token: Token,
        policy: DepositPolicy,
    ) -> ActionResult<(CoinSelection, u64)> {
        let selection = self.fetch(address, token).await?;
        let amount = policy.safe_amount(selection.total());
        debug!(token = %token, balance = selection.total(), safe = amount, "Safe amount computed");
        if amount == 0 {
            return Err(PreconditionError::AmountTooSmall { token }.into());
        }
        Ok((selection, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChain;
    use creek_chain::Command;

    fn coins(balances: &[u64]) -> Vec<CoinObjectRef> {
        balances
            .iter()
            .enumerate()
            .map(|(i, b)| CoinObjectRef {
                id: format!("0xc{}", i),
                balance: *b,
            })
            .collect()
    }

    #[test]
    fn test_merge_then_split() {
        let selection = CoinSelection::new(Token::Usdc, coins(&[5, 7, 9])).unwrap();
        assert_eq!(selection.total(), 21);

        let mut tx = TransactionBuilder::new();
        let split = selection.split_exact(&mut tx, 20);
        let request = tx.build(1);

        assert_eq!(split, Argument::NestedResult(1, 0));
        assert_eq!(
            request.commands[0],
            Command::MergeCoins {
                destination: Argument::object("0xc0"),
                sources: vec![Argument::object("0xc1"), Argument::object("0xc2")],
            }
        );
        assert!(request.split_amounts().iter().all(|a| *a <= selection.total()));
    }

    #[test]
    fn test_single_coin_skips_merge() {
        let selection = CoinSelection::new(Token::Gr, coins(&[100])).unwrap();
        let mut tx = TransactionBuilder::new();
        selection.split_exact(&mut tx, 10);
        let request = tx.build(1);
        assert_eq!(request.commands.len(), 1);
        assert!(request.merged_sources().is_empty());
    }

    #[test]
    fn test_require_amount() {
        let selection = CoinSelection::new(Token::Gusd, coins(&[3])).unwrap();
        assert!(selection.require(3).is_ok());
        assert_eq!(
            selection.require(4),
            Err(PreconditionError::InsufficientBalance {
                token: Token::Gusd,
                required: 4,
                available: 3
            })
        );
        assert!(CoinSelection::new(Token::Gusd, vec![]).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_until_coins_appear() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        chain.set_empty_fetches(Token::Xaum, 2);
        chain.add_coin(Token::Xaum, 3_000_000_000);

        let selector = CoinSelector::new(chain.clone(), &config);
        let selection = selector.fetch("0xabc", Token::Xaum).await.unwrap();
        assert_eq!(selection.total(), 3_000_000_000);
        assert_eq!(chain.coin_fetches(Token::Xaum), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_gives_up_after_retries() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        let selector = CoinSelector::new(chain.clone(), &config);

        let err = selector.fetch("0xabc", Token::Gusd).await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::ResourceNotFound {
                token: Token::Gusd,
                attempts: 5
            }
        ));
        assert_eq!(chain.coin_fetches(Token::Gusd), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_cooldown() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        chain.set_rate_limited_fetches(Token::Usdc, 1);
        chain.add_coin(Token::Usdc, 10);

        let selector = CoinSelector::new(chain.clone(), &config);
        let start = tokio::time::Instant::now();
        selector.fetch("0xabc", Token::Usdc).await.unwrap();

        // two retry delays of at least 10s plus the 30s cooldown
        assert!(start.elapsed() >= Duration::from_secs(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_rate_limit_surfaces() {
        let mut config = BotConfig::default();
        config.retry.coin_fetch_retries = 2;
        let chain = Arc::new(MockChain::new(&config));
        chain.set_rate_limited_fetches(Token::Usdc, 10);

        let selector = CoinSelector::new(chain, &config);
        let err = selector.fetch("0xabc", Token::Usdc).await.unwrap_err();
        assert!(matches!(err, ActionError::RateLimited));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_stops_retrying() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        chain.set_undecodable_fetches(Token::Usdc, 1);
        chain.add_coin(Token::Usdc, 10);

        let selector = CoinSelector::new(chain.clone(), &config);
        let err = selector.fetch("0xabc", Token::Usdc).await.unwrap_err();
        assert!(matches!(err, ActionError::Network(_)));
        assert_eq!(chain.coin_fetches(Token::Usdc), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_safe_too_small() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        chain.add_coin(Token::Gr, 40_000_000_000);

        let selector = CoinSelector::new(chain, &config);
        let err = selector
            .select_safe("0xabc", Token::Gr, config.assets.gr)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Precondition(PreconditionError::AmountTooSmall { token: Token::Gr })
        ));
    }
}
