//! Daily cycle over every wallet.
//!
//! Wallets run strictly one after another. Each cycle re-reads the key file,
//! runs every wallet, logs the daily summary, then sleeps until
//! `cycle start + cycle length`. Shutdown is observed before each wallet,
//! during the inter-wallet delay and during the inter-cycle sleep; a wallet
//! already running is never interrupted.

use creek_chain::SignerFactory;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::BotConfig;
use crate::error::ActionResult;
use crate::keys::{KeySource, ProxySource};
use crate::pipeline::{WalletIdentity, WalletPipeline};
use crate::stats::DailyStats;
use crate::timing::pause;

/// Resolves once `shutdown` reads true. Never resolves if the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Drives the daily cycle.
pub struct Scheduler {
    config: Arc<BotConfig>,
    pipeline: WalletPipeline,
    signers: Arc<dyn SignerFactory>,
    keys: KeySource,
    proxies: ProxySource,
}

impl Scheduler {
    pub fn new(
        config: Arc<BotConfig>,
        pipeline: WalletPipeline,
        signers: Arc<dyn SignerFactory>,
        keys: KeySource,
        proxies: ProxySource,
    ) -> Self {
        Self {
            config,
            pipeline,
            signers,
            keys,
            proxies,
        }
    }

    /// Run cycles until shutdown.
    ///
    /// Returns an error only when a cycle starts without usable keys.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ActionResult<()> {
        let mut day = 1;
        loop {
            let cycle_start = Instant::now();
            let daily = self.run_cycle(day, &mut shutdown).await?;
            daily.log_summary(&self.config.counts);

            if *shutdown.borrow() {
                info!(day, "Shutdown requested, stopping after cycle");
                return Ok(());
            }

            let next = cycle_start + self.config.timing.cycle_length();
            info!(
                day,
                next_in_secs = next.saturating_duration_since(Instant::now()).as_secs(),
                "Sleeping until next cycle"
            );
            tokio::select! {
                _ = tokio::time::sleep_until(next) => {}
                _ = shutdown_requested(&mut shutdown) => {
                    info!(day, "Shutdown requested during cycle sleep");
                    return Ok(());
                }
            }
            day += 1;
        }
    }

    /// Run every wallet once.
    pub async fn run_cycle(
        &self,
        day: u64,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ActionResult<DailyStats> {
        let keys = self.keys.load()?;
        let proxies = self.proxies.load();
        let mut daily = DailyStats::new(day, keys.len());
        info!(day, wallets = keys.len(), proxies = proxies.assigned(), "Cycle started");

        for (index, key) in keys.iter().enumerate() {
            if index > 0 {
                tokio::select! {
                    _ = pause(self.config.timing.inter_wallet_delay, "next wallet") => {}
                    _ = shutdown_requested(shutdown) => {}
                }
            }
            if *shutdown.borrow() {
                warn!(day, remaining = keys.len() - index, "Shutdown requested, ending cycle early");
                break;
            }

            let signer = match self.signers.signer_for(key.expose()).await {
                Ok(signer) => signer,
                Err(e) => {
                    error!(wallet = index + 1, error = %e, "Cannot load wallet signer");
                    daily.record_wallet_failure();
                    continue;
                }
            };
            let identity = WalletIdentity::new(index, signer);
            info!(
                wallet = index + 1,
                total = keys.len(),
                address = %identity.address(),
                "Processing wallet"
            );

            let run = AssertUnwindSafe(self.pipeline.run(&identity, proxies.for_wallet(index)))
                .catch_unwind()
                .await;
            match run {
                Ok(report) => daily.record_wallet(report.success, &report.stats),
                Err(_) => {
                    error!(wallet = index + 1, "Wallet run aborted unexpectedly");
                    daily.record_wallet_failure();
                }
            }
        }

        daily.finish();
        Ok(daily)
    }
}
