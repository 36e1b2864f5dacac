mod helpers;

use std::sync::Arc;

use helpers::{dashboard_over, run};
use rust_decimal::Decimal;
use ticklens::{
    CacheConfig, ConnectorBuilder, Lookback, MarketConnector, MarketZone, NoticeLevel, RangeSpec,
    RetryConfig, Sampling, Section, SnapshotConnector,
};
use ticklens_core::compute_moving_average;

// Mar 1, 4, 5 and 6 2024 at midnight UTC; the Mar 5 bar has no close.
const FRAME: &str = r#"{
    "columns": [["Close","AAPL"],["High","AAPL"],["Low","AAPL"],["Open","AAPL"],["Volume","AAPL"]],
    "index": [1709251200000, 1709510400000, 1709596800000, 1709683200000],
    "data": [
        [10.0, 10.5, 9.5, 9.8, 1000],
        [11.0, null, null, null, 2000],
        [null, 12.0, 10.0, 11.0, 3000],
        [12.5, 13.0, 12.0, 12.2, null]
    ]
}"#;

fn snapshot() -> Arc<SnapshotConnector> {
    Arc::new(SnapshotConnector::from_json(FRAME).unwrap())
}

#[tokio::test]
async fn rows_without_close_keep_their_volume() {
    let dashboard = dashboard_over(snapshot());
    let table = dashboard
        .fetch_ohlcv("AAPL", RangeSpec::lookback(Lookback::Max, Sampling::D1))
        .await
        .unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.zone(), MarketZone::Utc);
    let rows = table.rows();
    assert_eq!(rows[1].close, Some(Decimal::new(110, 1)));
    assert_eq!(rows[1].open, None);
    assert_eq!(rows[1].high, None);
    assert_eq!(rows[2].close, None);
    assert_eq!(rows[2].high, Some(Decimal::new(120, 1)));
    assert_eq!(rows[2].volume, Some(3000));
    assert_eq!(rows[3].close, Some(Decimal::new(125, 1)));
    assert_eq!(rows[3].volume, None);
    assert_eq!(table.volumes().total(), 6000);
}

#[tokio::test]
async fn missing_close_leaves_average_undefined() {
    let dashboard = dashboard_over(snapshot());
    let table = dashboard
        .fetch_ohlcv("AAPL", RangeSpec::lookback(Lookback::Max, Sampling::D1))
        .await
        .unwrap();
    let closes = table.closes();
    assert_eq!(closes.len(), 4);

    let ma = compute_moving_average(&closes, 2).unwrap();
    let averages: Vec<_> = ma.points().iter().map(|p| p.value).collect();
    assert_eq!(
        averages,
        vec![None, Some(Decimal::new(105, 1)), None, None]
    );
}

#[tokio::test]
async fn wrapped_snapshot_still_serves_tables() {
    let raw: Arc<dyn MarketConnector> = snapshot();
    let retry = RetryConfig {
        max_attempts: 2,
        min_backoff_ms: 1,
        max_backoff_ms: 1,
        factor: 1,
        jitter_percent: 0,
    };
    let connector = ConnectorBuilder::new(raw)
        .with_cache(&CacheConfig::default())
        .with_retry(&retry)
        .build()
        .unwrap();
    assert!(connector.as_table_provider().is_some());
    assert!(connector.as_history_provider().is_none());

    let table = dashboard_over(connector)
        .fetch_ohlcv("AAPL", RangeSpec::lookback(Lookback::Max, Sampling::D1))
        .await
        .unwrap();
    assert_eq!(table.len(), 4);
}

#[tokio::test]
async fn date_ranges_filter_snapshot_rows() {
    let dashboard = dashboard_over(snapshot());
    let range = RangeSpec::between(
        chrono::NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
        Sampling::D1,
    )
    .unwrap();
    let table = dashboard.fetch_ohlcv("AAPL", range).await.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].close, Some(Decimal::new(110, 1)));
    assert_eq!(table.rows()[1].close, None);
}

#[tokio::test]
async fn dashboard_runs_offline_from_snapshot() {
    let dashboard = dashboard_over(snapshot());
    let report = run(
        &dashboard,
        "aapl",
        RangeSpec::lookback(Lookback::M1, Sampling::D1),
        5,
    )
    .await;

    assert_eq!(report.source, SnapshotConnector::NAME);
    assert!(!report.has_errors(), "{:?}", report.notices);

    let history = report.price_history.as_ref().unwrap();
    assert_eq!(history.table.total_rows, 4);
    assert_eq!(history.overlay.points[2].close, None);
    assert_eq!(history.overlay.defined_averages(), 0);
    assert!(
        report
            .notices_for(Section::PriceHistory)
            .any(|n| n.level == NoticeLevel::Warning)
    );

    let latest = report.latest_price.as_ref().unwrap();
    assert_eq!(latest.close, Decimal::new(125, 1));

    let pie = report.monthly_volume.as_ref().unwrap();
    assert_eq!(pie.total, 6000);
    assert_eq!(pie.slices.len(), 1);
    assert_eq!(pie.slices[0].label, "Mar 2024");

    for section in [Section::CompanyInfo, Section::Financials] {
        let notices: Vec<_> = report.notices_for(section).collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Not available from Snapshot file.");
    }
}

#[test]
fn load_reads_file_and_reports_missing_path() {
    let path = std::env::temp_dir().join(format!("ticklens-snapshot-{}.json", std::process::id()));
    std::fs::write(&path, FRAME).unwrap();
    assert!(SnapshotConnector::load(&path).is_ok());
    std::fs::remove_file(&path).unwrap();

    let err = SnapshotConnector::load(&path).err().unwrap();
    assert!(matches!(err, ticklens::LensError::Data(_)));
}
