//! XAUM staking and redemption.

use creek_chain::TransactionBuilder;

use super::{ActionBuilder, BuiltAction};
use crate::config::Token;
use crate::error::{ActionResult, PreconditionError};

impl ActionBuilder {
    pub(super) async fn stake_xaum(&self, address: &str) -> ActionResult<BuiltAction> {
        let amount = self.config.amounts.stake.sample(self.config.decimals);
        if amount == 0 {
            return Err(PreconditionError::AmountTooSmall { token: Token::Xaum }.into());
        }
        let selection = self.coins.select_exact(address, Token::Xaum, amount).await?;

        let mut tx = TransactionBuilder::new();
        let coin = selection.split_exact(&mut tx, amount);
        tx.move_call(
            self.protocol_call("staking_manager", "stake_xaum")
                .arg(Self::object(&self.config.protocol.staking_manager))
                .arg(coin),
        );

        Ok(self.finish(tx, amount))
    }

    /// Unstake by returning GR and GY in equal amounts.
    ///
    /// Both balances must cover the amount before anything is built.
    pub(super) async fn redeem_xaum(&self, address: &str) -> ActionResult<BuiltAction> {
        let amounts = &self.config.amounts;
        let amount = amounts
            .redeem
            .sample(self.config.decimals)
            .saturating_mul(amounts.redeem_ratio);
        if amount == 0 {
            return Err(PreconditionError::AmountTooSmall { token: Token::Gr }.into());
        }

        let gr = self.coins.select_exact(address, Token::Gr, amount).await?;
        let gy = self.coins.select_exact(address, Token::Gy, amount).await?;

        let mut tx = TransactionBuilder::new();
        let gr_coin = gr.split_exact(&mut tx, amount);
        let gy_coin = gy.split_exact(&mut tx, amount);
        tx.move_call(
            self.protocol_call("staking_manager", "unstake")
                .arg(Self::object(&self.config.protocol.staking_manager))
                .arg(gr_coin)
                .arg(gy_coin),
        );

        Ok(self.finish(tx, amount))
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::{ActionBuilder, ActionKind};
    use crate::config::{BotConfig, Token};
    use crate::error::{ActionError, PreconditionError};
    use crate::obligation::ObligationTracker;
    use crate::testing::MockChain;
    use std::sync::Arc;

    const E9: u64 = 1_000_000_000;

    #[tokio::test(start_paused = true)]
    async fn test_stake_splits_random_amount() {
        let config = Arc::new(BotConfig::default());
        let chain = Arc::new(MockChain::new(&config));
        chain.add_coin(Token::Xaum, 3 * E9);
        let builder = ActionBuilder::new(config, chain);

        let built = builder
            .build(ActionKind::StakeXaum, "0xabc", &ObligationTracker::new())
            .await
            .unwrap();
        assert!((E9..3 * E9).contains(&built.amount));
        assert!(built.request.calls("staking_manager", "stake_xaum"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redeem_uses_equal_gr_and_gy() {
        let config = Arc::new(BotConfig::default());
        let chain = Arc::new(MockChain::new(&config));
        chain.add_coin(Token::Gr, 200 * E9);
        chain.add_coin(Token::Gy, 150 * E9);
        chain.add_coin(Token::Gy, 50 * E9);
        let builder = ActionBuilder::new(config, chain);

        let built = builder
            .build(ActionKind::RedeemXaum, "0xabc", &ObligationTracker::new())
            .await
            .unwrap();
        let splits = built.request.split_amounts();

        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0], splits[1]);
        assert!((10 * E9..100 * E9).contains(&splits[0]));
        let unstake = built.request.move_calls().last().unwrap();
        assert!(unstake.is("staking_manager", "unstake"));
        assert_eq!(unstake.arguments.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redeem_aborts_without_gy() {
        let config = Arc::new(BotConfig::default());
        let chain = Arc::new(MockChain::new(&config));
        chain.add_coin(Token::Gr, 200 * E9);
        chain.add_coin(Token::Gy, E9);
        let builder = ActionBuilder::new(config, chain.clone());

        let err = builder
            .build(ActionKind::RedeemXaum, "0xabc", &ObligationTracker::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Precondition(PreconditionError::InsufficientBalance {
                token: Token::Gy,
                ..
            })
        ));
        assert!(chain.submitted().is_empty());
    }
}
