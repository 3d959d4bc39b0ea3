//! Price-refresh commands for the lending protocol's oracle.
//!
//! Borrow and withdraw read prices that must be refreshed inside the same
//! transaction. Each asset needs a request/set/confirm triple, and the triples
//! go in ahead of the call that depends on them.

use crate::transaction::{Argument, MoveCall, ObjectId, TransactionBuilder};

/// Price to publish for one coin type, scaled by 1e9.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeed {
    pub coin_type: String,
    pub price: u64,
}

impl PriceFeed {
    /// Build from a human price, rounding to the nearest base unit.
    pub fn from_price(coin_type: impl Into<String>, price: f64) -> Self {
        Self {
            coin_type: coin_type.into(),
            price: (price * 1e9).round() as u64,
        }
    }
}

/// On-chain objects the refresh calls touch.
#[derive(Debug, Clone)]
pub struct OracleObjects {
    pub oracle_package: ObjectId,
    pub rule_package: ObjectId,
    pub x_oracle: ObjectId,
    pub clock: ObjectId,
}

/// Appends price-refresh triples to a transaction.
#[derive(Debug, Clone)]
pub struct PriceBundler {
    objects: OracleObjects,
}

impl PriceBundler {
    pub fn new(objects: OracleObjects) -> Self {
        Self { objects }
    }

    /// Append one triple per feed, preserving feed order.
    pub fn append_to(&self, tx: &mut TransactionBuilder, feeds: &[PriceFeed]) {
        for feed in feeds {
            let request = tx.move_call(
                MoveCall::new(&self.objects.oracle_package, "x_oracle", "price_update_request")
                    .type_arg(&feed.coin_type)
                    .arg(Argument::object(&self.objects.x_oracle)),
            );

            tx.move_call(
                MoveCall::new(&self.objects.rule_package, "rule", "set_price_as_primary")
                    .type_arg(&feed.coin_type)
                    .arg(request.clone())
                    .arg(Argument::U64(feed.price))
                    .arg(Argument::object(&self.objects.clock)),
            );

            tx.move_call(
                MoveCall::new(
                    &self.objects.oracle_package,
                    "x_oracle",
                    "confirm_price_update_request",
                )
                .type_arg(&feed.coin_type)
                .arg(Argument::object(&self.objects.x_oracle))
                .arg(request)
                .arg(Argument::object(&self.objects.clock)),
            );
        }
    }
}
