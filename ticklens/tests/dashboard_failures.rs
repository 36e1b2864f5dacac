mod helpers;

use std::sync::Arc;

use helpers::{ONE_MONTH, dashboard_over, mock_dashboard, run};
use ticklens::{
    CacheConfig, ConnectorBuilder, LensError, MarketConnector, NoticeLevel, PLACEHOLDER,
    RetryConfig, Section,
};
use ticklens_mock::{DynamicMock, MockBehavior, fixture_history};

const NO_DATA: &str = "No data found. Please check the ticker symbol.";
const FETCH_ERROR: &str = "Error fetching data. Please ensure the ticker is correct.";
const NO_LATEST_PRICE: &str = "Real-time price not available.";

fn single(report: &ticklens::DashboardReport, section: Section) -> (NoticeLevel, String) {
    let notices: Vec<_> = report.notices_for(section).collect();
    assert_eq!(notices.len(), 1, "{section:?}: {notices:?}");
    (notices[0].level, notices[0].message.clone())
}

#[tokio::test]
async fn empty_history_degrades_every_section_to_warnings() {
    for symbol in ["EMPTY", "ZZZZ"] {
        let dashboard = mock_dashboard();
        let report = run(&dashboard, symbol, ONE_MONTH, 20).await;

        assert!(!report.has_errors(), "{symbol}: {:?}", report.notices);
        assert!(report.price_history.is_none());
        assert!(report.long_run.is_none());
        assert!(report.latest_price.is_none());
        assert!(report.financials.is_none());
        assert!(report.monthly_volume.is_none());

        for section in [
            Section::PriceHistory,
            Section::CompanyInfo,
            Section::LongRunHistory,
            Section::Financials,
            Section::MonthlyVolume,
        ] {
            assert_eq!(
                single(&report, section),
                (NoticeLevel::Warning, NO_DATA.to_string()),
                "{symbol} {section:?}"
            );
        }
        assert_eq!(
            single(&report, Section::LatestPrice),
            (NoticeLevel::Warning, NO_LATEST_PRICE.to_string())
        );
        assert!(
            report
                .company
                .display_fields()
                .iter()
                .all(|(_, v)| v == PLACEHOLDER)
        );
    }
}

#[tokio::test]
async fn connector_failures_become_error_notices() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "FAIL", ONE_MONTH, 20).await;

    assert!(report.has_errors());
    for section in [
        Section::PriceHistory,
        Section::CompanyInfo,
        Section::LongRunHistory,
        Section::Financials,
        Section::MonthlyVolume,
    ] {
        assert_eq!(
            single(&report, section),
            (NoticeLevel::Error, FETCH_ERROR.to_string()),
            "{section:?}"
        );
    }
    assert_eq!(single(&report, Section::LatestPrice).0, NoticeLevel::Warning);
}

#[tokio::test]
async fn slow_provider_hits_timeout() {
    let dashboard = mock_dashboard();
    let started = std::time::Instant::now();
    let report = run(&dashboard, "TIMEOUT", ONE_MONTH, 20).await;

    assert!(started.elapsed() < ticklens_mock::TIMEOUT_DELAY);
    assert!(report.price_history.is_none());
    assert_eq!(
        single(&report, Section::PriceHistory),
        (NoticeLevel::Error, FETCH_ERROR.to_string())
    );
}

#[tokio::test]
async fn missing_capabilities_are_reported_by_vendor() {
    let mock = Arc::new(DynamicMock::new());
    mock.set_history("AAPL", MockBehavior::Return(fixture_history("AAPL").unwrap()))
        .await;
    let dashboard = dashboard_over(mock.clone());
    let report = run(&dashboard, "AAPL", ONE_MONTH, 20).await;

    assert!(report.price_history.is_some());
    assert_eq!(
        single(&report, Section::Financials),
        (NoticeLevel::Warning, "Not available from Mock.".to_string())
    );
    // profile is unscripted, so the dynamic mock answers not-found
    assert_eq!(
        single(&report, Section::CompanyInfo),
        (NoticeLevel::Warning, NO_DATA.to_string())
    );
}

#[tokio::test]
async fn repeated_runs_are_served_from_cache() {
    let mock = Arc::new(DynamicMock::new());
    mock.set_history("AAPL", MockBehavior::Return(fixture_history("AAPL").unwrap()))
        .await;
    let raw: Arc<dyn MarketConnector> = mock.clone();
    let connector = ConnectorBuilder::new(raw)
        .with_cache(&CacheConfig::default())
        .build()
        .unwrap();
    let dashboard = dashboard_over(connector);

    run(&dashboard, "AAPL", ONE_MONTH, 20).await;
    // price history, long run, latest price and monthly volume use distinct ranges
    assert_eq!(mock.history_calls(), 4);
    run(&dashboard, "aapl", ONE_MONTH, 10).await;
    assert_eq!(mock.history_calls(), 4);
}

#[tokio::test]
async fn transient_history_failures_are_retried() {
    let mock = Arc::new(DynamicMock::new());
    mock.set_history(
        "AAPL",
        MockBehavior::FailTimes {
            failures: 2,
            error: LensError::connector("ticklens-dynamic-mock", "503"),
            then: fixture_history("AAPL").unwrap(),
        },
    )
    .await;
    let raw: Arc<dyn MarketConnector> = mock.clone();
    let retry = RetryConfig {
        max_attempts: 3,
        min_backoff_ms: 1,
        max_backoff_ms: 5,
        factor: 2,
        jitter_percent: 0,
    };
    let connector = ConnectorBuilder::new(raw)
        .without_cache()
        .with_retry(&retry)
        .build()
        .unwrap();
    let report = run(&dashboard_over(connector), "AAPL", ONE_MONTH, 20).await;

    assert!(report.price_history.is_some());
    assert!(report.long_run.is_some());
    assert!(report.latest_price.is_some());
    assert!(report.monthly_volume.is_some());
    assert_eq!(mock.history_calls(), 6);
}
