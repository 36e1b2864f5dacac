#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ticklens::{Dashboard, DashboardReport, Lookback, MarketConnector, RangeSpec, Sampling};
use ticklens_mock::MockConnector;

pub const ONE_MONTH: RangeSpec = RangeSpec::lookback(Lookback::M1, Sampling::D1);

/// Dashboard over the fixture connector with a short provider timeout.
pub fn mock_dashboard() -> Dashboard {
    dashboard_over(Arc::new(MockConnector::new()))
}

pub fn dashboard_over(connector: Arc<dyn MarketConnector>) -> Dashboard {
    Dashboard::builder()
        .with_connector(connector)
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap()
}

pub async fn run(dashboard: &Dashboard, symbol: &str, range: RangeSpec, window: usize) -> DashboardReport {
    let req = dashboard.request(symbol, range, Some(window)).unwrap();
    dashboard.run(&req).await
}
