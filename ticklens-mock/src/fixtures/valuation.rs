use rust_decimal::Decimal;
use ticklens_core::Valuation;

use super::usd;

pub fn by_symbol(s: &str) -> Option<Valuation> {
    let (cap, pe) = match s {
        "AAPL" => (Some(3_450_000_000_000), Some(Decimal::new(3521, 2))),
        "MSFT" => (Some(3_120_000_000_000), Some(Decimal::new(3676, 2))),
        "NVDA" => (Some(2_900_000_000_000), Some(Decimal::new(5402, 2))),
        "KO" => (Some(265_000_000_000), None),
        _ => return None,
    };
    Some(Valuation {
        market_cap: cap.and_then(usd),
        trailing_pe: pe,
    })
}
