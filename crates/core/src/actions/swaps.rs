//! USDC/GUSD vault swaps.

use creek_chain::TransactionBuilder;

use super::{ActionBuilder, BuiltAction};
use crate::config::{AmountRange, Token};
use crate::error::{ActionResult, PreconditionError};

impl ActionBuilder {
    pub(super) async fn swap_usdc_to_gusd(&self, address: &str) -> ActionResult<BuiltAction> {
        self.swap(address, Token::Usdc, self.config.amounts.usdc_to_gusd, "mint_gusd")
            .await
    }

    pub(super) async fn swap_gusd_to_usdc(&self, address: &str) -> ActionResult<BuiltAction> {
        self.swap(address, Token::Gusd, self.config.amounts.gusd_to_usdc, "redeem_gusd")
            .await
    }

    /// Split a random amount of `token` and pass it to the vault.
    ///
    /// Minting takes the clock; redeeming does not.
    async fn swap(
        &self,
        address: &str,
        token: Token,
        range: AmountRange,
        function: &str,
    ) -> ActionResult<BuiltAction> {
        let amount = range.sample(self.config.decimals);
        if amount == 0 {
            return Err(PreconditionError::AmountTooSmall { token }.into());
        }
        let selection = self.coins.select_exact(address, token, amount).await?;

        let protocol = &self.config.protocol;
        let mut tx = TransactionBuilder::new();
        let coin = selection.split_exact(&mut tx, amount);
        let mut call = self
            .protocol_call("gusd_usdc_vault", function)
            .arg(Self::object(&protocol.gusd_vault))
            .arg(Self::object(&protocol.market))
            .arg(coin);
        if token == Token::Usdc {
            call = call.arg(Self::object(&protocol.clock));
        }
        tx.move_call(call);

        Ok(self.finish(tx, amount))
    }
}
