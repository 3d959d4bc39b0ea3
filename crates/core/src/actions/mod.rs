//! Transaction construction per action kind.
//!
//! Every builder returns a complete [`TransactionRequest`] or an error
//! raised before anything is submitted. Builders read balances through the
//! coin selector but never submit.

mod claims;
mod lending;
mod staking;
mod swaps;

use creek_chain::{
    Argument, ChainClient, MoveCall, PriceBundler, PriceFeed, TransactionBuilder,
    TransactionRequest,
};
use std::fmt;
use std::sync::Arc;

use crate::coin_selector::CoinSelector;
use crate::config::BotConfig;
use crate::error::ActionResult;
use crate::obligation::ObligationTracker;

/// Every action the pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    ClaimXaum,
    ClaimUsdc,
    SwapUsdcToGusd,
    SwapGusdToUsdc,
    StakeXaum,
    RedeemXaum,
    DepositGr,
    DepositSui,
    DepositUsdc,
    BorrowGusd,
    RepayGusd,
    WithdrawGr,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        Self::ClaimXaum,
        Self::ClaimUsdc,
        Self::SwapUsdcToGusd,
        Self::SwapGusdToUsdc,
        Self::StakeXaum,
        Self::RedeemXaum,
        Self::DepositGr,
        Self::DepositSui,
        Self::DepositUsdc,
        Self::BorrowGusd,
        Self::RepayGusd,
        Self::WithdrawGr,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClaimXaum => "claim_xaum",
            Self::ClaimUsdc => "claim_usdc",
            Self::SwapUsdcToGusd => "swap_usdc_gusd",
            Self::SwapGusdToUsdc => "swap_gusd_usdc",
            Self::StakeXaum => "stake_xaum",
            Self::RedeemXaum => "redeem_xaum",
            Self::DepositGr => "deposit_gr",
            Self::DepositSui => "deposit_sui",
            Self::DepositUsdc => "deposit_usdc",
            Self::BorrowGusd => "borrow_gusd",
            Self::RepayGusd => "repay_gusd",
            Self::WithdrawGr => "withdraw_gr",
        }
    }

    /// Configured repetitions per wallet.
    pub fn target(&self, counts: &crate::config::ActionCounts) -> u32 {
        match self {
            Self::ClaimXaum => counts.xaum_claims,
            Self::ClaimUsdc => counts.usdc_claims,
            Self::SwapUsdcToGusd => counts.usdc_to_gusd,
            Self::SwapGusdToUsdc => counts.gusd_to_usdc,
            Self::StakeXaum => counts.stakes,
            Self::RedeemXaum => counts.redeems,
            Self::DepositGr => counts.gr_deposits,
            Self::DepositSui => counts.sui_deposits,
            Self::DepositUsdc => counts.usdc_deposits,
            Self::BorrowGusd => counts.borrows,
            Self::RepayGusd => counts.repays,
            Self::WithdrawGr => counts.withdraws,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A built transaction and what it does.
#[derive(Debug, Clone)]
pub struct BuiltAction {
    pub request: TransactionRequest,
    /// Principal amount moved, in base units
    pub amount: u64,
    /// Whether the transaction opens a new obligation
    pub opens_obligation: bool,
}

/// Builds transactions for every [`ActionKind`].
pub struct ActionBuilder {
    config: Arc<BotConfig>,
    coins: CoinSelector,
    chain: Arc<dyn ChainClient>,
    prices: PriceBundler,
    feeds: Vec<PriceFeed>,
}

impl ActionBuilder {
    pub fn new(config: Arc<BotConfig>, chain: Arc<dyn ChainClient>) -> Self {
        let coins = CoinSelector::new(chain.clone(), &config);
        let prices = PriceBundler::new(config.protocol.oracle_objects());
        let feeds = config.assets.price_feeds(&config.protocol.coin_types);
        Self {
            config,
            coins,
            chain,
            prices,
            feeds,
        }
    }

    /// Build the transaction for one repetition of `kind`.
    pub async fn build(
        &self,
        kind: ActionKind,
        address: &str,
        tracker: &ObligationTracker,
    ) -> ActionResult<BuiltAction> {
        match kind {
            ActionKind::ClaimXaum => Ok(self.claim_xaum(address)),
            ActionKind::ClaimUsdc => Ok(self.claim_usdc(address)),
            ActionKind::SwapUsdcToGusd => self.swap_usdc_to_gusd(address).await,
            ActionKind::SwapGusdToUsdc => self.swap_gusd_to_usdc(address).await,
            ActionKind::StakeXaum => self.stake_xaum(address).await,
            ActionKind::RedeemXaum => self.redeem_xaum(address).await,
            ActionKind::DepositGr => self.deposit_gr(address, tracker).await,
            ActionKind::DepositSui => self.deposit_sui(address, tracker).await,
            ActionKind::DepositUsdc => self.deposit_usdc(address, tracker).await,
            ActionKind::BorrowGusd => self.borrow_gusd(tracker),
            ActionKind::RepayGusd => self.repay_gusd(address, tracker).await,
            ActionKind::WithdrawGr => self.withdraw_gr(tracker),
        }
    }

    fn finish(&self, tx: TransactionBuilder, amount: u64) -> BuiltAction {
        BuiltAction {
            request: tx.build(self.config.gas_budget),
            amount,
            opens_obligation: false,
        }
    }

    fn object(id: &str) -> Argument {
        Argument::object(id)
    }

    fn protocol_call(&self, module: &str, function: &str) -> MoveCall {
        MoveCall::new(&self.config.protocol.lending_package, module, function)
    }
}
