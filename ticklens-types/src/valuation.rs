use rust_decimal::Decimal;
use paft::money::Money;
use serde::{Deserialize, Serialize};

/// Market valuation figures for an instrument.
///
/// Every field is optional: providers routinely omit some of them and callers
/// render the gaps as placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Valuation {
    /// Market capitalization.
    pub market_cap: Option<Money>,
    /// Price over trailing twelve-month earnings per share.
    pub trailing_pe: Option<Decimal>,
}
