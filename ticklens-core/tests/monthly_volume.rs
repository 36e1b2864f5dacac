use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use ticklens_core::{MarketZone, Observation, VolumeSeries, aggregate_monthly_volume};

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn vols(zone: MarketZone, points: &[(DateTime<Utc>, u64)]) -> VolumeSeries {
    VolumeSeries::new(
        zone,
        points.iter().map(|(ts, v)| Observation::new(*ts, *v)).collect(),
    )
    .unwrap()
}

#[test]
fn groups_by_calendar_month_with_labels() {
    let series = vols(
        MarketZone::Utc,
        &[
            (utc(2025, 6, 1, 0), 100),
            (utc(2025, 6, 15, 0), 50),
            (utc(2025, 7, 1, 0), 200),
        ],
    );
    let agg = aggregate_monthly_volume(&series);
    let got: Vec<_> = agg.months().iter().map(|m| (m.label(), m.total)).collect();
    assert_eq!(
        got,
        vec![("Jun 2025".to_string(), 150), ("Jul 2025".to_string(), 200)]
    );
    assert_eq!(agg.total(), 350);
}

#[test]
fn empty_series_has_no_months() {
    let agg = aggregate_monthly_volume(&vols(MarketZone::Utc, &[]));
    assert!(agg.is_empty());
    assert_eq!(agg.total(), 0);
}

#[test]
fn month_with_only_zero_volume_is_still_listed() {
    let series = vols(
        MarketZone::Utc,
        &[(utc(2025, 1, 31, 0), 10), (utc(2025, 2, 3, 0), 0)],
    );
    let agg = aggregate_monthly_volume(&series);
    assert_eq!(agg.len(), 2);
    assert_eq!(agg.months()[1].total, 0);
    assert_eq!(agg.months()[1].label(), "Feb 2025");
}

#[test]
fn months_are_evaluated_in_the_series_zone() {
    // 2025-07-01 02:00 UTC is still June 30 in New York
    let ts = utc(2025, 7, 1, 2);
    let named = aggregate_monthly_volume(&vols(MarketZone::Named(New_York), &[(ts, 5)]));
    assert_eq!(named.months()[0].label(), "Jun 2025");

    let offset = aggregate_monthly_volume(&vols(MarketZone::Offset(-4 * 3_600), &[(ts, 5)]));
    assert_eq!(offset.months()[0].label(), "Jun 2025");

    let plain = aggregate_monthly_volume(&vols(MarketZone::Utc, &[(ts, 5)]));
    assert_eq!(plain.months()[0].label(), "Jul 2025");
}

#[test]
fn output_spans_year_boundaries_chronologically() {
    let series = vols(
        MarketZone::Utc,
        &[
            (utc(2024, 11, 20, 0), 1),
            (utc(2024, 12, 20, 0), 2),
            (utc(2025, 1, 20, 0), 3),
        ],
    );
    let labels: Vec<_> = aggregate_monthly_volume(&series)
        .months()
        .iter()
        .map(|m| m.label())
        .collect();
    assert_eq!(labels, vec!["Nov 2024", "Dec 2024", "Jan 2025"]);
}

#[test]
fn totals_exceeding_u64_stay_exact() {
    let series = vols(
        MarketZone::Utc,
        &[(utc(2025, 3, 1, 0), u64::MAX), (utc(2025, 3, 2, 0), u64::MAX)],
    );
    let agg = aggregate_monthly_volume(&series);
    assert_eq!(agg.months()[0].total, u128::from(u64::MAX) * 2);
}

#[test]
fn shares_sum_to_one_hundred_percent() {
    let series = vols(
        MarketZone::Utc,
        &[(utc(2025, 6, 1, 0), 150), (utc(2025, 7, 1, 0), 50)],
    );
    let agg = aggregate_monthly_volume(&series);
    let shares: Vec<f64> = agg.months().iter().map(|m| m.share_of(agg.total())).collect();
    assert!((shares[0] - 75.0).abs() < 1e-9);
    assert!((shares[1] - 25.0).abs() < 1e-9);
    assert!((agg.months()[0].share_of(0)).abs() < f64::EPSILON);
}
