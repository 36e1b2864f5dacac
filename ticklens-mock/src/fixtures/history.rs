use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::America::New_York;
use ticklens_core::{Candle, HistoryMeta, HistoryResponse, Lookback, RangeSpec};

use super::usd_cents;

/// Trading sessions generated per fixture symbol.
const SESSIONS: usize = 260;

struct Shape {
    base_cents: i64,
    drift_cents: i64,
    base_volume: u64,
}

fn shape(symbol: &str) -> Option<Shape> {
    let (base_cents, drift_cents, base_volume) = match symbol {
        "AAPL" => (18_500, 9, 52_000_000),
        "MSFT" => (41_000, 14, 21_000_000),
        "NVDA" => (11_000, 11, 240_000_000),
        "KO" => (6_100, 1, 13_000_000),
        "TIMEOUT" => (1_000, 0, 1_000),
        _ => return None,
    };
    Some(Shape {
        base_cents,
        drift_cents,
        base_volume,
    })
}

fn first_session() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or(NaiveDate::MIN)
}

fn sessions() -> impl Iterator<Item = NaiveDate> {
    first_session()
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(SESSIONS)
}

/// Deterministic daily bars for `symbol`, or `None` if the symbol is not a fixture.
pub fn by_symbol(symbol: &str) -> Option<HistoryResponse> {
    let p = shape(symbol)?;
    let candles = sessions()
        .enumerate()
        .filter_map(|(i, day)| {
            let i = i as i64;
            // saw-tooth around a linear drift keeps highs/lows non-trivial
            let wiggle = (i * 37).rem_euclid(41) - 20;
            let close = p.base_cents + p.drift_cents * i + wiggle * 10;
            let open = close - wiggle * 3;
            let high = open.max(close) + 55;
            let low = open.min(close) - 55;
            let volume = p.base_volume + ((i * 7_919).rem_euclid(97) as u64) * (p.base_volume / 200);
            // 14:30 UTC is within the New York session all year round
            let ts = day.and_hms_opt(14, 30, 0)?.and_utc();
            Some(Candle {
                ts,
                open: usd_cents(open)?,
                high: usd_cents(high)?,
                low: usd_cents(low)?,
                close: usd_cents(close)?,
                close_unadj: None,
                volume: Some(volume),
            })
        })
        .collect();
    Some(HistoryResponse {
        candles,
        actions: vec![],
        adjusted: false,
        meta: Some(HistoryMeta {
            timezone: Some(New_York),
            utc_offset_seconds: None,
        }),
    })
}

/// Empty provider answer, as returned for unknown tickers.
pub fn empty() -> HistoryResponse {
    HistoryResponse {
        candles: vec![],
        actions: vec![],
        adjusted: false,
        meta: None,
    }
}

/// Narrow a full fixture to what `range` would have returned.
///
/// Lookbacks count sessions back from the last fixture bar, date ranges filter
/// by calendar day.
pub fn slice(mut resp: HistoryResponse, range: &RangeSpec) -> HistoryResponse {
    match range {
        RangeSpec::Lookback { period, .. } => {
            let keep = match period {
                Lookback::D1 => 1,
                Lookback::D2 => 2,
                Lookback::D5 => 5,
                Lookback::M1 => 21,
                Lookback::M3 => 63,
                Lookback::M6 => 126,
                Lookback::Y1 | Lookback::Y5 | Lookback::Y10 | Lookback::Ytd | Lookback::Max => {
                    resp.candles.len()
                }
            };
            let skip = resp.candles.len().saturating_sub(keep);
            resp.candles.drain(..skip);
        }
        RangeSpec::Dates { start, end, .. } => {
            let (start, end) = (*start, *end);
            resp.candles.retain(|c| {
                let day = c.ts.date_naive();
                day >= start && day < end
            });
        }
    }
    resp
}
