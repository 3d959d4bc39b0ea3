//! Lending actions: collateral deposits, borrow, repay, withdraw.
//!
//! Borrow and withdraw read oracle prices, so every price feed is refreshed
//! inside the same transaction ahead of the lending call.

use creek_chain::{Argument, MoveCall, TransactionBuilder};
use tracing::debug;

use super::{ActionBuilder, BuiltAction};
use crate::config::Token;
use crate::error::{ActionResult, PreconditionError};
use crate::obligation::ObligationTracker;

impl ActionBuilder {
    fn deposit_call(&self, token: Token, obligation: Argument, coin: Argument) -> MoveCall {
        let protocol = &self.config.protocol;
        self.protocol_call("deposit_collateral", "deposit_collateral")
            .type_arg(token.coin_type(&protocol.coin_types))
            .arg(Self::object(&protocol.protocol_object))
            .arg(obligation)
            .arg(Self::object(&protocol.market))
            .arg(coin)
    }

    /// Deposit GR under the safe-amount policy.
    ///
    /// With no obligation yet, the same transaction opens one, deposits into
    /// it, sends the key to `address` and hands the obligation back to the
    /// protocol.
    pub(super) async fn deposit_gr(
        &self,
        address: &str,
        tracker: &ObligationTracker,
    ) -> ActionResult<BuiltAction> {
        let (selection, amount) = self
            .coins
            .select_safe(address, Token::Gr, self.config.assets.gr)
            .await?;

        let protocol = &self.config.protocol;
        let mut tx = TransactionBuilder::new();
        let merged = selection.merge_into(&mut tx);

        let opens_obligation = match tracker.current() {
            Some(obligation) => {
                let coin = tx.split_coin(merged, amount);
                tx.move_call(self.deposit_call(Token::Gr, Self::object(&obligation.id), coin));
                false
            }
            None => {
                let [obligation, key, cap] = tx.move_call_tuple::<3>(
                    self.protocol_call("open_obligation", "open_obligation")
                        .arg(Self::object(&protocol.protocol_object)),
                );
                let coin = tx.split_coin(merged, amount);
                tx.move_call(self.deposit_call(Token::Gr, obligation.clone(), coin));
                tx.transfer_objects(vec![key], address);
                tx.move_call(
                    self.protocol_call("open_obligation", "return_obligation")
                        .arg(Self::object(&protocol.protocol_object))
                        .arg(obligation)
                        .arg(cap),
                );
                true
            }
        };

        let mut built = self.finish(tx, amount);
        built.opens_obligation = opens_obligation;
        Ok(built)
    }

    /// Deposit native SUI split from the gas coin.
    ///
    /// Amount is the lesser of the safe amount and a random cap.
    pub(super) async fn deposit_sui(
        &self,
        address: &str,
        tracker: &ObligationTracker,
    ) -> ActionResult<BuiltAction> {
        let obligation = tracker.require()?;
        let balance = self.chain.get_balance(address).await?;
        let safe = self.config.assets.sui.safe_amount(balance);
        let cap = self
            .config
            .amounts
            .sui_deposit_cap
            .sample(self.config.decimals);
        let amount = safe.min(cap);
        debug!(balance, safe, cap, amount, "SUI deposit sized");
        if amount == 0 {
            return Err(PreconditionError::AmountTooSmall { token: Token::Sui }.into());
        }

        let mut tx = TransactionBuilder::new();
        let coin = tx.split_coin(Argument::GasCoin, amount);
        tx.move_call(self.deposit_call(Token::Sui, Self::object(&obligation.id), coin));

        Ok(self.finish(tx, amount))
    }

    pub(super) async fn deposit_usdc(
        &self,
        address: &str,
        tracker: &ObligationTracker,
    ) -> ActionResult<BuiltAction> {
        let obligation = tracker.require()?;
        let (selection, amount) = self
            .coins
            .select_safe(address, Token::Usdc, self.config.assets.usdc)
            .await?;

        let mut tx = TransactionBuilder::new();
        let coin = selection.split_exact(&mut tx, amount);
        tx.move_call(self.deposit_call(Token::Usdc, Self::object(&obligation.id), coin));

        Ok(self.finish(tx, amount))
    }

    /// Borrow a fixed GUSD amount after refreshing every price.
    pub(super) fn borrow_gusd(&self, tracker: &ObligationTracker) -> ActionResult<BuiltAction> {
        let (obligation, key) = tracker.require_with_key()?;
        let protocol = &self.config.protocol;
        let amount = self.config.amounts.borrow;

        let mut tx = TransactionBuilder::new();
        self.prices.append_to(&mut tx, &self.feeds);
        tx.move_call(
            self.protocol_call("borrow", "borrow_entry")
                .type_arg(&protocol.coin_types.gusd)
                .arg(Self::object(&protocol.protocol_object))
                .arg(Self::object(&obligation.id))
                .arg(Self::object(key))
                .arg(Self::object(&protocol.market))
                .arg(Self::object(&protocol.price_oracle))
                .arg(Argument::U64(amount))
                .arg(Self::object(&protocol.x_oracle))
                .arg(Self::object(&protocol.clock)),
        );

        Ok(self.finish(tx, amount))
    }

    /// Repay `min(floor(balance * fraction), cap)` GUSD.
    pub(super) async fn repay_gusd(
        &self,
        address: &str,
        tracker: &ObligationTracker,
    ) -> ActionResult<BuiltAction> {
        let obligation = tracker.require()?;
        let selection = self.coins.fetch(address, Token::Gusd).await?;
        let amount = self.config.amounts.repay_amount(selection.total());
        debug!(balance = selection.total(), amount, "Repay sized");
        if amount == 0 {
            return Err(PreconditionError::AmountTooSmall { token: Token::Gusd }.into());
        }

        let protocol = &self.config.protocol;
        let mut tx = TransactionBuilder::new();
        let coin = selection.split_exact(&mut tx, amount);
        tx.move_call(
            self.protocol_call("repay", "repay")
                .type_arg(&protocol.coin_types.gusd)
                .arg(Self::object(&protocol.protocol_object))
                .arg(Self::object(&obligation.id))
                .arg(Self::object(&protocol.market))
                .arg(coin)
                .arg(Self::object(&protocol.clock)),
        );

        Ok(self.finish(tx, amount))
    }

    /// Withdraw a fixed small amount of GR collateral after refreshing prices.
    pub(super) fn withdraw_gr(&self, tracker: &ObligationTracker) -> ActionResult<BuiltAction> {
        let (obligation, key) = tracker.require_with_key()?;
        let protocol = &self.config.protocol;
        let amount = self.config.amounts.withdraw;

        let mut tx = TransactionBuilder::new();
        self.prices.append_to(&mut tx, &self.feeds);
        tx.move_call(
            self.protocol_call("withdraw_collateral", "withdraw_collateral_entry")
                .type_arg(&protocol.coin_types.gr)
                .arg(Self::object(&protocol.protocol_object))
                .arg(Self::object(&obligation.id))
                .arg(Self::object(key))
                .arg(Self::object(&protocol.market))
                .arg(Self::object(&protocol.price_oracle))
                .arg(Argument::U64(amount))
                .arg(Self::object(&protocol.x_oracle))
                .arg(Self::object(&protocol.clock)),
        );

        Ok(self.finish(tx, amount))
    }
}
