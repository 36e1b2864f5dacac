use chrono::NaiveDate;
use ticklens_types::{DashboardConfig, LensError, Lookback, RetryConfig};

#[test]
fn empty_document_yields_defaults() {
    let cfg = DashboardConfig::from_toml_str("").unwrap();
    assert_eq!(cfg, DashboardConfig::default());
    assert_eq!(cfg.default_window, 20);
    assert_eq!(cfg.history_since, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
    assert!(!cfg.retry.is_enabled(), "retry must be opt-in");
}

#[test]
fn partial_tables_keep_remaining_defaults() {
    let raw = r#"
        table_tail_rows = 10
        volume_lookback = "1y"

        [retry]
        max_attempts = 3

        [cache]
        ttl_ms = 1000
    "#;
    let cfg = DashboardConfig::from_toml_str(raw).unwrap();
    assert_eq!(cfg.table_tail_rows, 10);
    assert_eq!(cfg.volume_lookback, Lookback::Y1);
    assert_eq!(cfg.retry.max_attempts, 3);
    assert_eq!(cfg.retry.factor, RetryConfig::default().factor);
    assert_eq!(cfg.cache.ttl_ms, Some(1000));
    assert!(cfg.cache.enabled);
}

#[test]
fn unknown_lookback_code_is_rejected() {
    let err = DashboardConfig::from_toml_str(r#"volume_lookback = "6 months""#).unwrap_err();
    assert!(matches!(err, LensError::InvalidArg(_)), "got {err:?}");
}

#[test]
fn inconsistent_window_bounds_are_rejected() {
    let err = DashboardConfig::from_toml_str("min_window = 30\nmax_window = 10").unwrap_err();
    assert!(matches!(err, LensError::InvalidArg(msg) if msg.contains("window bounds")));
}

#[test]
fn zero_attempt_retry_policy_is_rejected() {
    let err = DashboardConfig::from_toml_str("[retry]\nmax_attempts = 0").unwrap_err();
    assert!(matches!(err, LensError::InvalidArg(msg) if msg.contains("max_attempts")));
}
