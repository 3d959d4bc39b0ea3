//! Test-token faucet claims.

use creek_chain::{Argument, MoveCall, TransactionBuilder};

use super::{ActionBuilder, BuiltAction};

impl ActionBuilder {
    pub(super) fn claim_xaum(&self, address: &str) -> BuiltAction {
        let protocol = &self.config.protocol;
        self.mint(
            "coin_xaum",
            &protocol.xaum_object,
            self.config.amounts.xaum_claim,
            address,
        )
    }

    pub(super) fn claim_usdc(&self, address: &str) -> BuiltAction {
        let protocol = &self.config.protocol;
        self.mint(
            "usdc",
            &protocol.usdc_object,
            self.config.amounts.usdc_claim,
            address,
        )
    }

    /// `module::mint(shared, amount, recipient)`; no coin input.
    fn mint(&self, module: &str, shared: &str, amount: u64, address: &str) -> BuiltAction {
        let mut tx = TransactionBuilder::new();
        tx.move_call(
            MoveCall::new(&self.config.protocol.faucet_package, module, "mint")
                .arg(Self::object(shared))
                .arg(Argument::U64(amount))
                .arg(Argument::address(address)),
        );
        self.finish(tx, amount)
    }
}
