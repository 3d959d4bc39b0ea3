//! Native balance gate run before any wallet action.
//!
//! Each attempt reads the balance and, while it is below the threshold,
//! asks the faucet for gas. Backoff depends on how the faucet answered. The
//! balance is read once more after the last attempt.

use creek_api::{FaucetApi, FaucetResponse};
use creek_chain::ChainClient;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::{BotConfig, DelayRange};
use crate::timing::{pause, pause_for};

/// Gate progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Requesting,
    CoolingDown,
    /// Balance at or above threshold
    Satisfied,
    /// Attempts used up; the wallet must not run
    Exhausted,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Checking => "checking",
            Self::Requesting => "requesting",
            Self::CoolingDown => "cooling_down",
            Self::Satisfied => "satisfied",
            Self::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

/// Terminal state of one gate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOutcome {
    pub state: GateState,
    /// Faucet requests made
    pub attempts: u32,
    /// Last observed native balance
    pub balance: u64,
}

impl GateOutcome {
    pub fn is_satisfied(&self) -> bool {
        self.state == GateState::Satisfied
    }
}

/// Ensures a wallet holds enough gas before its pipeline runs.
pub struct FaucetGate {
    chain: Arc<dyn ChainClient>,
    faucet: Arc<dyn FaucetApi>,
    min_balance: u64,
    max_attempts: u32,
    rate_limit_backoff: DelayRange,
    failure_backoff: DelayRange,
    recheck_delay: Duration,
}

impl FaucetGate {
    pub fn new(chain: Arc<dyn ChainClient>, faucet: Arc<dyn FaucetApi>, config: &BotConfig) -> Self {
        Self {
            chain,
            faucet,
            min_balance: config.faucet.min_native_balance,
            max_attempts: config.retry.faucet_attempts,
            rate_limit_backoff: config.timing.faucet_rate_limit_backoff,
            failure_backoff: config.timing.faucet_failure_backoff,
            recheck_delay: config.timing.faucet_recheck(),
        }
    }

    async fn read_balance(&self, address: &str) -> u64 {
        match self.chain.get_balance(address).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(error = %e, "Balance read failed, treating as empty");
                0
            }
        }
    }

    fn transition(&self, state: GateState, attempt: u32) {
        debug!(state = %state, attempt, max = self.max_attempts, "Faucet gate");
    }

    /// Run the gate until the balance is sufficient or attempts run out.
    #[instrument(skip(self, proxy), fields(proxied = proxy.is_some()))]
    pub async fn ensure_funded(&self, address: &str, proxy: Option<&str>) -> GateOutcome {
        let mut attempts = 0;

        loop {
            self.transition(GateState::Checking, attempts);
            let balance = self.read_balance(address).await;
            if balance >= self.min_balance {
                info!(balance, attempts, "Native balance sufficient");
                return GateOutcome {
                    state: GateState::Satisfied,
                    attempts,
                    balance,
                };
            }
            if attempts >= self.max_attempts {
                warn!(balance, attempts, "Faucet attempts exhausted");
                return GateOutcome {
                    state: GateState::Exhausted,
                    attempts,
                    balance,
                };
            }

            attempts += 1;
            self.transition(GateState::Requesting, attempts);
            match self.faucet.request_gas(address, proxy).await {
                FaucetResponse::Funded => {
                    info!(attempt = attempts, "Faucet funded");
                    pause_for(self.recheck_delay, "balance update").await;
                }
                FaucetResponse::RateLimited => {
                    self.transition(GateState::CoolingDown, attempts);
                    warn!(attempt = attempts, "Faucet rate limited");
                    pause(self.rate_limit_backoff, "faucet rate limit").await;
                }
                FaucetResponse::Rejected(reason) => {
                    warn!(attempt = attempts, reason = %reason, "Faucet request failed");
                    if attempts < self.max_attempts {
                        self.transition(GateState::CoolingDown, attempts);
                        pause(self.failure_backoff, "faucet retry").await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockChain, MockFaucet};

    const E9: u64 = 1_000_000_000;

    fn gate(chain: &Arc<MockChain>, faucet: &Arc<MockFaucet>, config: &BotConfig) -> FaucetGate {
        FaucetGate::new(chain.clone(), faucet.clone(), config)
    }

    #[tokio::test]
    async fn test_funded_wallet_skips_faucet() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        chain.set_native_balance(E9);
        let faucet = Arc::new(MockFaucet::funding(chain.clone(), 10 * E9));

        let outcome = gate(&chain, &faucet, &config).ensure_funded("0xme", None).await;
        assert_eq!(outcome.state, GateState::Satisfied);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(faucet.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_satisfied_after_funding() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        let faucet = Arc::new(MockFaucet::funding(chain.clone(), 10 * E9).with_script(vec![
            FaucetResponse::RateLimited,
            FaucetResponse::Rejected("Status 500".into()),
        ]));

        let outcome = gate(&chain, &faucet, &config)
            .ensure_funded("0xme", Some("http://proxy:8080"))
            .await;
        assert!(outcome.is_satisfied());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.balance, 10 * E9);
        assert_eq!(faucet.proxies_seen(), vec![Some("http://proxy:8080".to_string()); 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_exact_attempts() {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        let faucet = Arc::new(MockFaucet::always(chain.clone(), FaucetResponse::RateLimited));

        let outcome = gate(&chain, &faucet, &config).ensure_funded("0xme", None).await;
        assert_eq!(outcome.state, GateState::Exhausted);
        assert_eq!(outcome.attempts, 50);
        assert_eq!(faucet.request_count(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_recheck_catches_late_funds() {
        let mut config = BotConfig::default();
        config.retry.faucet_attempts = 2;
        let chain = Arc::new(MockChain::new(&config));
        // Funded on the last attempt; only the final re-check sees it
        let faucet = Arc::new(
            MockFaucet::always(chain.clone(), FaucetResponse::Rejected("Error".into()))
                .with_script(vec![FaucetResponse::Rejected("Error".into()), FaucetResponse::Funded])
                .with_grant(5 * E9),
        );

        let outcome = gate(&chain, &faucet, &config).ensure_funded("0xme", None).await;
        assert!(outcome.is_satisfied());
        assert_eq!(outcome.attempts, 2);
    }

    async fn elapsed_until_funded(first: FaucetResponse) -> Duration {
        let config = BotConfig::default();
        let chain = Arc::new(MockChain::new(&config));
        let faucet = Arc::new(MockFaucet::funding(chain.clone(), 10 * E9).with_script(vec![first]));

        let start = tokio::time::Instant::now();
        let outcome = gate(&chain, &faucet, &config).ensure_funded("0xme", None).await;
        assert!(outcome.is_satisfied());
        assert_eq!(outcome.attempts, 2);
        start.elapsed()
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_depends_on_response_class() {
        // backoff plus the 3s re-check after the funded response
        let failure = elapsed_until_funded(FaucetResponse::Rejected("Status 500".into())).await;
        assert!(failure >= Duration::from_secs(2 + 3), "{:?}", failure);
        assert!(failure <= Duration::from_secs(6 + 3), "{:?}", failure);

        let limited = elapsed_until_funded(FaucetResponse::RateLimited).await;
        assert!(limited >= Duration::from_secs(3 + 3), "{:?}", limited);
        assert!(limited <= Duration::from_secs(10 + 3), "{:?}", limited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_failure_skips_backoff() {
        let mut config = BotConfig::default();
        config.retry.faucet_attempts = 1;
        let chain = Arc::new(MockChain::new(&config));
        let faucet = Arc::new(MockFaucet::always(
            chain.clone(),
            FaucetResponse::Rejected("Error".into()),
        ));

        let start = tokio::time::Instant::now();
        let outcome = gate(&chain, &faucet, &config).ensure_funded("0xme", None).await;
        assert_eq!(outcome.state, GateState::Exhausted);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
