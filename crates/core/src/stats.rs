//! Per-wallet and per-cycle action statistics.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::info;

use crate::actions::ActionKind;
use crate::config::ActionCounts;

/// Outcome counts for one action kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionTally {
    pub succeeded: u32,
    pub failed: u32,
    /// Repetitions never attempted because required state was missing
    pub skipped: u32,
}

impl ActionTally {
    pub fn attempted(&self) -> u32 {
        self.succeeded + self.failed
    }

    fn merge(&mut self, other: &ActionTally) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Tallies accumulated over one wallet run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletStats {
    tallies: BTreeMap<ActionKind, ActionTally>,
}

impl WalletStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, kind: ActionKind) {
        self.tallies.entry(kind).or_default().succeeded += 1;
    }

    pub fn record_failure(&mut self, kind: ActionKind) {
        self.tallies.entry(kind).or_default().failed += 1;
    }

    pub fn record_skipped(&mut self, kind: ActionKind, repetitions: u32) {
        self.tallies.entry(kind).or_default().skipped += repetitions;
    }

    pub fn tally(&self, kind: ActionKind) -> ActionTally {
        self.tallies.get(&kind).copied().unwrap_or_default()
    }

    pub fn succeeded(&self, kind: ActionKind) -> u32 {
        self.tally(kind).succeeded
    }

    pub fn failed(&self, kind: ActionKind) -> u32 {
        self.tally(kind).failed
    }

    pub fn total_succeeded(&self) -> u32 {
        self.tallies.values().map(|t| t.succeeded).sum()
    }

    /// Add `other`'s tallies into this one.
    pub fn merge(&mut self, other: &WalletStats) {
        for (kind, tally) in &other.tallies {
            self.tallies.entry(*kind).or_default().merge(tally);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionKind, ActionTally)> + '_ {
        self.tallies.iter().map(|(k, t)| (*k, *t))
    }
}

/// Totals for one daily cycle.
#[derive(Debug, Clone)]
pub struct DailyStats {
    pub day: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub wallets_total: usize,
    pub wallets_succeeded: usize,
    pub wallets_failed: usize,
    pub actions: WalletStats,
}

impl DailyStats {
    pub fn new(day: u64, wallets_total: usize) -> Self {
        Self {
            day,
            started_at: Utc::now(),
            finished_at: None,
            wallets_total,
            wallets_succeeded: 0,
            wallets_failed: 0,
            actions: WalletStats::default(),
        }
    }

    /// Fold one wallet's outcome into the totals.
    pub fn record_wallet(&mut self, success: bool, stats: &WalletStats) {
        if success {
            self.wallets_succeeded += 1;
        } else {
            self.wallets_failed += 1;
        }
        self.actions.merge(stats);
    }

    /// Count a wallet that never produced stats (signer setup or panic).
    pub fn record_wallet_failure(&mut self) {
        self.wallets_failed += 1;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    /// Emit the cycle summary, with per-action totals against targets.
    pub fn log_summary(&self, counts: &ActionCounts) {
        info!(
            day = self.day,
            started = %self.started_at.format("%Y-%m-%d %H:%M:%S"),
            duration_mins = self.duration().num_minutes(),
            wallets = self.wallets_total,
            succeeded = self.wallets_succeeded,
            failed = self.wallets_failed,
            "Cycle complete"
        );
        for kind in ActionKind::ALL {
            let tally = self.actions.tally(kind);
            info!(
                action = kind.label(),
                succeeded = tally.succeeded,
                failed = tally.failed,
                skipped = tally.skipped,
                target = kind.target(counts) as usize * self.wallets_total,
                "Action total"
            );
        }
    }
}
