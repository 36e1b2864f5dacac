use ticklens_core::connector::MarketConnector;
use ticklens_core::{AssetKind, Instrument, LensError, Lookback, OhlcvTable, RangeSpec, Sampling};
use ticklens_mock::{DynamicMock, MockBehavior, MockConnector, fixture_history};

fn inst(s: &str) -> Instrument {
    Instrument::from_symbol(s, AssetKind::Equity).unwrap()
}

#[tokio::test]
async fn history_is_deterministic_and_lookbacks_slice_the_tail() {
    let mock = MockConnector::new();
    let hist = mock.as_history_provider().unwrap();
    let six_months = RangeSpec::lookback(Lookback::M6, Sampling::D1);

    let a = hist.history(&inst("AAPL"), six_months).await.unwrap();
    let b = hist.history(&inst("AAPL"), six_months).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.candles.len(), 126);

    let full = fixture_history("AAPL").unwrap();
    assert_eq!(a.candles.last(), full.candles.last());

    let table = OhlcvTable::from_history(&a).unwrap();
    assert!(table.rows().windows(2).all(|w| w[0].ts < w[1].ts));
}

#[tokio::test]
async fn date_ranges_filter_by_calendar_day() {
    let mock = MockConnector::new();
    let start = chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    let end = chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let range = RangeSpec::between(start, end, Sampling::D1).unwrap();
    let resp = mock
        .as_history_provider()
        .unwrap()
        .history(&inst("MSFT"), range)
        .await
        .unwrap();
    assert_eq!(resp.candles.len(), 22, "weekdays in August 2024");
    assert!(resp
        .candles
        .iter()
        .all(|c| c.ts.date_naive() >= start && c.ts.date_naive() < end));
}

#[tokio::test]
async fn reserved_symbols_drive_failure_paths() {
    let mock = MockConnector::new();
    let range = RangeSpec::lookback(Lookback::M1, Sampling::D1);
    let hist = mock.as_history_provider().unwrap();

    let err = hist.history(&inst("FAIL"), range).await.unwrap_err();
    assert!(matches!(err, LensError::Connector { .. }));

    let empty = hist.history(&inst("EMPTY"), range).await.unwrap();
    assert!(empty.candles.is_empty());

    let err = mock
        .as_profile_provider()
        .unwrap()
        .profile(&inst("ZZZZ"))
        .await
        .unwrap_err();
    assert!(matches!(err, LensError::NotFound { .. }));
}

#[tokio::test]
async fn dynamic_mock_fails_then_recovers_and_counts_calls() {
    let mock = DynamicMock::new();
    let ok = fixture_history("KO").unwrap();
    mock.set_history(
        "KO",
        MockBehavior::FailTimes {
            failures: 2,
            error: LensError::connector("dyn", "boom"),
            then: ok.clone(),
        },
    )
    .await;
    let range = RangeSpec::lookback(Lookback::Y1, Sampling::D1);
    let hist = mock.as_history_provider().unwrap();

    assert!(hist.history(&inst("KO"), range).await.is_err());
    assert!(hist.history(&inst("KO"), range).await.is_err());
    assert_eq!(hist.history(&inst("KO"), range).await.unwrap(), ok);
    assert_eq!(mock.history_calls(), 3);
    assert_eq!(mock.history_requests().await.len(), 3);
    assert!(mock.as_valuation_provider().is_none());
}
