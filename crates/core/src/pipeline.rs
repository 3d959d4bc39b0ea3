//! Per-wallet action sequence.
//!
//! A wallet run is the faucet gate followed by a declarative plan of
//! `(action, repetitions, requirement)` steps evaluated by one loop. A step
//! whose requirement is unmet is skipped as a whole and tallied as skipped.
//! Action errors never escape a step; they are logged and tallied.

use creek_api::FaucetApi;
use creek_chain::{ChainClient, TransactionResult, TransactionSigner};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::actions::{ActionBuilder, ActionKind};
use crate::balances::WalletBalances;
use crate::config::{ActionCounts, BotConfig};
use crate::error::ActionResult;
use crate::executor::TransactionExecutor;
use crate::faucet_gate::{FaucetGate, GateOutcome};
use crate::health::{HealthFactorGuard, HealthReport};
use crate::obligation::{Obligation, ObligationTracker};
use crate::stats::WalletStats;

/// State a step needs before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    None,
    /// An obligation opened earlier in the run
    Obligation,
}

/// One entry of the wallet plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStep {
    pub action: ActionKind,
    pub repetitions: u32,
    pub requires: Requirement,
}

impl PipelineStep {
    fn new(action: ActionKind, repetitions: u32, requires: Requirement) -> Self {
        Self {
            action,
            repetitions,
            requires,
        }
    }
}

/// Fixed action order.
///
/// The first GR deposit opens the obligation; every later lending step
/// requires it.
pub fn default_plan(counts: &ActionCounts) -> Vec<PipelineStep> {
    use ActionKind::*;
    use Requirement::{None as Free, Obligation as Open};

    let opening = counts.gr_deposits.min(1);
    vec![
        PipelineStep::new(ClaimXaum, counts.xaum_claims, Free),
        PipelineStep::new(ClaimUsdc, counts.usdc_claims, Free),
        PipelineStep::new(SwapUsdcToGusd, counts.usdc_to_gusd, Free),
        PipelineStep::new(SwapGusdToUsdc, counts.gusd_to_usdc, Free),
        PipelineStep::new(StakeXaum, counts.stakes, Free),
        PipelineStep::new(RedeemXaum, counts.redeems, Free),
        PipelineStep::new(DepositGr, opening, Free),
        PipelineStep::new(DepositGr, counts.gr_deposits - opening, Open),
        PipelineStep::new(DepositSui, counts.sui_deposits, Open),
        PipelineStep::new(DepositUsdc, counts.usdc_deposits, Open),
        PipelineStep::new(BorrowGusd, counts.borrows, Open),
        PipelineStep::new(RepayGusd, counts.repays, Open),
        PipelineStep::new(WithdrawGr, counts.withdraws, Open),
    ]
}

/// Signing capability and position of one wallet. Never shared.
pub struct WalletIdentity {
    /// 0-based position in the key file
    pub index: usize,
    pub signer: Box<dyn TransactionSigner>,
}

impl WalletIdentity {
    pub fn new(index: usize, signer: Box<dyn TransactionSigner>) -> Self {
        Self { index, signer }
    }

    pub fn address(&self) -> &str {
        self.signer.address()
    }
}

/// Result of one wallet run.
#[derive(Debug, Clone)]
pub struct WalletReport {
    pub address: String,
    pub stats: WalletStats,
    pub funding: GateOutcome,
    pub obligation: Option<Obligation>,
    pub health: Option<HealthReport>,
    pub before: WalletBalances,
    /// Absent when the gate stopped the run
    pub after: Option<WalletBalances>,
    pub success: bool,
}

/// Runs the plan for one wallet at a time.
pub struct WalletPipeline {
    config: Arc<BotConfig>,
    chain: Arc<dyn ChainClient>,
    builder: ActionBuilder,
    executor: TransactionExecutor,
    gate: FaucetGate,
    guard: HealthFactorGuard,
    plan: Vec<PipelineStep>,
}

impl WalletPipeline {
    pub fn new(
        config: Arc<BotConfig>,
        chain: Arc<dyn ChainClient>,
        faucet: Arc<dyn FaucetApi>,
    ) -> Self {
        Self {
            builder: ActionBuilder::new(config.clone(), chain.clone()),
            executor: TransactionExecutor::new(chain.clone(), config.timing.post_success_cooldown),
            gate: FaucetGate::new(chain.clone(), faucet, &config),
            guard: HealthFactorGuard::new(&config),
            plan: default_plan(&config.counts),
            config,
            chain,
        }
    }

    pub fn plan(&self) -> &[PipelineStep] {
        &self.plan
    }

    async fn snapshot(&self, address: &str) -> WalletBalances {
        WalletBalances::snapshot(self.chain.as_ref(), &self.config.protocol.coin_types, address)
            .await
    }

    /// Build and execute one repetition of `kind`.
    ///
    /// Records the obligation when the transaction opened one.
    pub async fn perform(
        &self,
        kind: ActionKind,
        signer: &dyn TransactionSigner,
        tracker: &mut ObligationTracker,
    ) -> ActionResult<TransactionResult> {
        let built = self.builder.build(kind, signer.address(), tracker).await?;
        let result = self
            .executor
            .execute(kind.label(), &built.request, signer)
            .await?;
        if built.opens_obligation {
            tracker.record_creation(&result);
        }
        Ok(result)
    }

    /// Run the gate and the whole plan for one wallet.
    #[instrument(skip(self, identity, proxy), fields(wallet = identity.index, address = %identity.address()))]
    pub async fn run(&self, identity: &WalletIdentity, proxy: Option<&str>) -> WalletReport {
        let address = identity.address();
        let decimals = self.config.decimals;

        let before = self.snapshot(address).await;
        before.log("before", decimals);

        let funding = self.gate.ensure_funded(address, proxy).await;
        if !funding.is_satisfied() {
            warn!(attempts = funding.attempts, "Wallet not funded, skipping all actions");
            return WalletReport {
                address: address.to_string(),
                stats: WalletStats::new(),
                funding,
                obligation: None,
                health: None,
                before,
                after: None,
                success: false,
            };
        }

        let mut stats = WalletStats::new();
        let mut tracker = ObligationTracker::new();

        for step in &self.plan {
            if step.repetitions == 0 {
                continue;
            }
            if step.requires == Requirement::Obligation && !tracker.is_open() {
                info!(
                    action = step.action.label(),
                    repetitions = step.repetitions,
                    "No obligation, skipping step"
                );
                stats.record_skipped(step.action, step.repetitions);
                continue;
            }

            for repetition in 1..=step.repetitions {
                match self
                    .perform(step.action, identity.signer.as_ref(), &mut tracker)
                    .await
                {
                    Ok(_) => stats.record_success(step.action),
                    Err(e) => {
                        warn!(
                            action = step.action.label(),
                            repetition,
                            kind = e.kind(),
                            error = %e,
                            "Action failed"
                        );
                        stats.record_failure(step.action);
                    }
                }
            }

            let tally = stats.tally(step.action);
            info!(
                action = step.action.label(),
                succeeded = tally.succeeded,
                target = step.action.target(&self.config.counts),
                "Step complete"
            );
        }

        let after = self.snapshot(address).await;
        after.log_deltas(&before, decimals);

        let health = tracker
            .current()
            .map(|_| self.guard.check(address, &after));

        info!(succeeded = stats.total_succeeded(), "Wallet run complete");
        WalletReport {
            address: address.to_string(),
            stats,
            funding,
            obligation: tracker.current().cloned(),
            health,
            before,
            after: Some(after),
            success: true,
        }
    }
}
