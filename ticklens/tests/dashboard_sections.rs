mod helpers;

use chrono::NaiveDate;
use helpers::{ONE_MONTH, mock_dashboard, run};
use rust_decimal::Decimal;
use ticklens::{LensError, Lookback, NoticeLevel, PLACEHOLDER, RangeSpec, Sampling, Section};
use ticklens_mock::fixture_history;

#[tokio::test]
async fn full_report_for_fixture_ticker() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "aapl", ONE_MONTH, 20).await;

    assert_eq!(report.symbol, "AAPL");
    assert_eq!(report.source, "ticklens-mock");
    assert!(!report.has_errors());
    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].level, NoticeLevel::Success);
    assert_eq!(report.notices[0].section, Section::PriceHistory);
    assert_eq!(report.notices[0].message, "Data fetched successfully.");

    let history = report.price_history.expect("price history");
    assert_eq!(history.table.total_rows, 21);
    assert_eq!(history.table.tail.len(), 5);
    assert_eq!(history.table.zone, "America/New_York");
    assert_eq!(history.overlay.window, 20);
    assert_eq!(history.overlay.points.len(), 21);
    assert_eq!(history.overlay.defined_averages(), 2);
    assert!(history.overlay.points[..19].iter().all(|p| p.average.is_none()));

    assert!(report.long_run.is_some());
    assert!(report.latest_price.is_some());
    assert!(report.financials.is_some());
    assert!(report.monthly_volume.is_some());
}

#[tokio::test]
async fn overlay_average_is_trailing_mean_of_closes() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "MSFT", ONE_MONTH, 5).await;
    let overlay = report.price_history.unwrap().overlay;

    let closes: Vec<Decimal> = overlay.points.iter().map(|p| p.close.unwrap()).collect();
    for (i, point) in overlay.points.iter().enumerate().skip(4) {
        let mean = closes[i - 4..=i].iter().copied().sum::<Decimal>() / Decimal::from(5);
        assert_eq!(point.average, Some(mean), "average at {i}");
    }
}

#[tokio::test]
async fn date_range_selects_calendar_window() {
    let dashboard = mock_dashboard();
    let range = RangeSpec::between(
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        Sampling::D1,
    )
    .unwrap();
    let report = run(&dashboard, "MSFT", range, 20).await;
    let history = report.price_history.unwrap();
    assert_eq!(history.table.total_rows, 22);
    assert_eq!(history.overlay.defined_averages(), 3);
}

#[tokio::test]
async fn company_fields_fall_back_to_placeholder() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "KO", ONE_MONTH, 20).await;

    let fields = report.company.display_fields();
    assert_eq!(fields[0], ("Company Name", "The Coca-Cola Company".to_string()));
    assert_eq!(fields[1], ("Sector", PLACEHOLDER.to_string()));
    assert_eq!(fields[2], ("Industry", "Beverages - Non-Alcoholic".to_string()));
    assert_ne!(fields[3].1, PLACEHOLDER);
    assert_eq!(fields[4], ("PE Ratio", PLACEHOLDER.to_string()));
    assert_eq!(report.notices_for(Section::CompanyInfo).count(), 0);
}

#[tokio::test]
async fn company_ratio_is_rounded_for_display() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "AAPL", ONE_MONTH, 20).await;
    assert_eq!(report.company.name.as_deref(), Some("Apple Inc."));
    assert_eq!(report.company.trailing_pe, Some(Decimal::new(3521, 2)));
    assert_eq!(report.company.display_fields()[4].1, "35.21");
}

#[tokio::test]
async fn latest_price_is_last_fixture_close() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "NVDA", ONE_MONTH, 20).await;

    let expected = fixture_history("NVDA").unwrap();
    let last = expected.candles.last().unwrap();
    let latest = report.latest_price.unwrap();
    assert_eq!(latest.title, "NVDA Real-Time Price (Close)");
    assert_eq!(latest.ts, last.ts);
    assert_eq!(latest.close, last.close.amount());
}

#[tokio::test]
async fn long_run_history_starts_at_configured_day() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "AAPL", ONE_MONTH, 20).await;
    let long_run = report.long_run.unwrap();
    assert_eq!(long_run.since, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
    assert_eq!(long_run.table.total_rows, 260);
    assert_eq!(
        long_run.table.first,
        fixture_history("AAPL").unwrap().candles.first().map(|c| c.ts)
    );
}

#[tokio::test]
async fn financials_carry_annual_rows() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "AAPL", ONE_MONTH, 20).await;
    let financials = report.financials.unwrap();
    assert_eq!(financials.balance_sheet.len(), 2);
    assert_eq!(financials.income_statement.len(), 2);
}

#[tokio::test]
async fn monthly_volume_conserves_total() {
    let dashboard = mock_dashboard();
    let report = run(&dashboard, "AAPL", ONE_MONTH, 20).await;
    let pie = report.monthly_volume.unwrap();

    let fixture = fixture_history("AAPL").unwrap();
    let expected: u128 = fixture.candles[fixture.candles.len() - 126..]
        .iter()
        .map(|c| u128::from(c.volume.unwrap()))
        .sum();
    assert_eq!(pie.title, "AAPL - Monthly Volume Distribution");
    assert_eq!(pie.lookback, Lookback::M6);
    assert_eq!(pie.total, expected);
    assert_eq!(pie.slices.iter().map(|s| s.total).sum::<u128>(), expected);

    let shares: f64 = pie.slices.iter().map(|s| s.share).sum();
    assert!((shares - 100.0).abs() < 1e-6, "shares sum to {shares}");
    assert!(pie.slices.len() >= 6 && pie.slices.len() <= 7);
}

#[tokio::test]
async fn short_history_warns_instead_of_failing() {
    let dashboard = mock_dashboard();
    let range = RangeSpec::lookback(Lookback::D5, Sampling::D1);
    let report = run(&dashboard, "AAPL", range, 50).await;

    let notices: Vec<_> = report.notices_for(Section::PriceHistory).collect();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[1].level, NoticeLevel::Warning);
    assert_eq!(
        notices[1].message,
        "Not enough data for a 50-period moving average (5 rows)."
    );
    let history = report.price_history.unwrap();
    assert_eq!(history.overlay.points.len(), 5);
    assert_eq!(history.overlay.defined_averages(), 0);
}

#[tokio::test]
async fn request_applies_window_bounds() {
    let dashboard = mock_dashboard();

    let req = dashboard.request(" msft ", ONE_MONTH, None).unwrap();
    assert_eq!(req.symbol(), "MSFT");
    assert_eq!(req.window(), 20);

    for bad in [4, 51] {
        let err = dashboard.request("MSFT", ONE_MONTH, Some(bad)).unwrap_err();
        assert!(matches!(err, LensError::InvalidArg(_)), "window {bad}: {err:?}");
    }
    assert!(matches!(
        dashboard.request("  ", ONE_MONTH, None),
        Err(LensError::InvalidArg(_))
    ));
}

#[test]
fn builder_requires_connector() {
    let err = ticklens::Dashboard::builder().build().err().unwrap();
    assert!(matches!(err, LensError::InvalidArg(_)));
}
