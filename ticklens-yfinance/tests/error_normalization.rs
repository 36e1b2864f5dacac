#![cfg(feature = "test-adapters")]

use std::sync::Arc;

use ticklens_core::connector::{HistoryProvider, ProfileProvider};
use ticklens_core::{AssetKind, Instrument, LensError, Lookback, RangeSpec, Sampling};
use ticklens_yfinance::{YfConnector, adapter};

struct Combo {
    h: Arc<dyn adapter::YfHistory>,
}
impl adapter::CloneArcAdapters for Combo {
    fn clone_arc_history(&self) -> Arc<dyn adapter::YfHistory> {
        self.h.clone()
    }
}

fn failing(err: LensError) -> YfConnector {
    let h = <dyn adapter::YfHistory>::from_fn(move |_, _| Err(err.clone()));
    YfConnector::from_adapter(&Combo { h })
}

const RANGE: RangeSpec = RangeSpec::lookback(Lookback::M1, Sampling::D1);

fn inst(s: &str) -> Instrument {
    Instrument::from_symbol(s, AssetKind::Equity).expect("valid test instrument")
}

#[tokio::test]
async fn other_error_is_tagged_with_connector_name() {
    let yf = failing(LensError::Other("some http error".to_string()));
    let err = yf.history(&inst("AAPL"), RANGE).await.unwrap_err();
    match err {
        LensError::Connector { connector, .. } => assert_eq!(connector, "ticklens-yfinance"),
        other => panic!("expected connector error, got {other:?}"),
    }
    assert!(LensError::connector("x", "y").is_transient());
}

#[tokio::test]
async fn not_found_message_maps_to_not_found() {
    let yf = failing(LensError::connector("ticklens-yfinance", "No data found, symbol may be delisted"));
    let err = yf.history(&inst("ZZZZ"), RANGE).await.unwrap_err();
    match err {
        LensError::NotFound { what } => assert_eq!(what, "history for ZZZZ"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn server_status_stays_a_connector_error() {
    let yf = failing(LensError::connector("yahoo", "server error 503: history for AAPL"));
    let err = yf.history(&inst("AAPL"), RANGE).await.unwrap_err();
    assert!(matches!(err, LensError::Connector { ref connector, .. } if connector == "ticklens-yfinance"));
    assert!(err.is_transient());
}

#[tokio::test]
async fn uninjected_roles_report_unsupported() {
    let yf = failing(LensError::Other("unused".into()));
    let err = yf.profile(&inst("AAPL")).await.unwrap_err();
    assert!(matches!(err, LensError::Unsupported { .. }));
}
