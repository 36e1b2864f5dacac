pub mod fundamentals;
pub mod history;
pub mod profile;
pub mod valuation;

use rust_decimal::Decimal;
use ticklens_core::{Currency, IsoCurrency, Money};

pub fn usd_cents(cents: i64) -> Option<Money> {
    Money::new(Decimal::new(cents, 2), Currency::Iso(IsoCurrency::USD)).ok()
}

pub fn usd(units: i64) -> Option<Money> {
    Money::new(Decimal::from(units), Currency::Iso(IsoCurrency::USD)).ok()
}
