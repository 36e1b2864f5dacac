#![cfg(feature = "test-adapters")]

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};
use ticklens_core::connector::HistoryProvider;
use ticklens_core::{
    AssetKind, Currency, Instrument, Interval, IsoCurrency, Lookback, Money, OhlcvTable,
    RangeSpec, Sampling,
};
use ticklens_yfinance::{YfConnector, adapter};
use yfinance_rs as yf;

struct Combo {
    h: Arc<dyn adapter::YfHistory>,
}
impl adapter::CloneArcAdapters for Combo {
    fn clone_arc_history(&self) -> Arc<dyn adapter::YfHistory> {
        self.h.clone()
    }
}

fn usd(v: &str) -> Money {
    Money::from_canonical_str(v, Currency::Iso(IsoCurrency::USD)).unwrap()
}

fn candle(secs: i64, close: &str, volume: u64) -> yf::Candle {
    yf::Candle {
        ts: Utc.timestamp_opt(secs, 0).unwrap(),
        open: usd(close),
        high: usd(close),
        low: usd(close),
        close: usd(close),
        close_unadj: None,
        volume: Some(volume),
    }
}

type Seen = Arc<Mutex<Vec<(String, yf::core::services::HistoryRequest)>>>;

fn recording(seen: &Seen) -> Arc<dyn adapter::YfHistory> {
    let seen = Arc::clone(seen);
    <dyn adapter::YfHistory>::from_fn(move |symbol, req| {
        seen.lock().unwrap().push((symbol, req));
        Ok(yf::HistoryResponse {
            candles: vec![
                candle(1_719_844_200, "210.50", 1_000),
                candle(1_719_930_600, "211.25", 2_000),
            ],
            actions: vec![],
            adjusted: true,
            meta: Some(yf::HistoryMeta {
                timezone: None,
                utc_offset_seconds: Some(0),
            }),
        })
    })
}

#[tokio::test]
async fn lookback_is_resolved_into_a_period_request() {
    let seen: Seen = Arc::default();
    let connector = YfConnector::from_adapter(&Combo { h: recording(&seen) });
    let inst = Instrument::from_symbol("AAPL", AssetKind::Equity).unwrap();

    let before = Utc::now();
    let resp = connector
        .history(&inst, RangeSpec::lookback(Lookback::M6, Sampling::W1))
        .await
        .unwrap();
    let after = Utc::now();
    assert_eq!(resp.candles.len(), 2);

    let calls = seen.lock().unwrap();
    let (symbol, req) = &calls[0];
    assert_eq!(symbol, "AAPL");
    assert!(req.range.is_none());
    assert!(req.auto_adjust);
    assert!(!req.include_prepost);
    assert!(matches!(req.interval, Interval::W1));

    let (start, end) = req.period.unwrap();
    assert!(end >= before.timestamp() && end <= after.timestamp());
    let span_days = (end - start) / 86_400;
    assert!((181..=184).contains(&span_days), "six months, got {span_days} days");
}

#[tokio::test]
async fn date_ranges_pass_through_exactly() {
    let seen: Seen = Arc::default();
    let connector = YfConnector::from_adapter(&Combo { h: recording(&seen) });
    let inst = Instrument::from_symbol("MSFT", AssetKind::Equity).unwrap();
    let start = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    connector
        .history(&inst, RangeSpec::between(start, end, Sampling::Mo1).unwrap())
        .await
        .unwrap();

    let calls = seen.lock().unwrap();
    let (_, req) = &calls[0];
    assert_eq!(req.period, Some((915_148_800, 1_704_067_200)));
    assert!(matches!(req.interval, Interval::M1));
}

#[tokio::test]
async fn provider_output_normalizes_into_a_table() {
    let seen: Seen = Arc::default();
    let connector = YfConnector::from_adapter(&Combo { h: recording(&seen) });
    let inst = Instrument::from_symbol("AAPL", AssetKind::Equity).unwrap();

    let resp = connector
        .history(&inst, RangeSpec::lookback(Lookback::D5, Sampling::D1))
        .await
        .unwrap();
    let table = OhlcvTable::from_history(&resp).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.volumes().total(), 3_000);
    assert_eq!(
        table.latest_close().map(|o| o.value),
        Some(rust_decimal::Decimal::new(21_125, 2))
    );
}
