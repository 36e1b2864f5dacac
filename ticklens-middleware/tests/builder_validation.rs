use std::sync::Arc;

use ticklens_core::connector::MarketConnector;
use ticklens_core::{CacheConfig, DashboardConfig, LensError, Middleware, RetryConfig};
use ticklens_middleware::ConnectorBuilder;
use ticklens_mock::MockConnector;

fn raw() -> Arc<dyn MarketConnector> {
    Arc::new(MockConnector::new())
}

#[test]
fn defaults_add_cache_only() {
    let builder = ConnectorBuilder::new(raw()).with_config(&DashboardConfig::default());
    assert_eq!(
        builder.layer_names(),
        vec!["CachingMiddleware", "ticklens-mock"]
    );
    let built = builder.build().unwrap();
    assert_eq!(built.name(), "ticklens-mock");
}

#[test]
fn config_toggles_layers() {
    let mut cfg = DashboardConfig::default();
    cfg.cache.enabled = false;
    cfg.retry = RetryConfig::attempts(3);
    let builder = ConnectorBuilder::new(raw()).with_config(&cfg);
    assert_eq!(builder.layer_names(), vec!["RetryMiddleware", "ticklens-mock"]);

    let described = builder.describe();
    assert_eq!(described["layers"][0]["config"]["max_attempts"], 3);
    assert_eq!(described["raw"], "ticklens-mock");
}

#[test]
fn invalid_retry_policy_is_rejected() {
    let bad = RetryConfig {
        max_attempts: 0,
        ..RetryConfig::default()
    };
    let err = ConnectorBuilder::new(raw())
        .with_retry(&bad)
        .build()
        .err()
        .unwrap();
    match err {
        LensError::InvalidMiddlewareStack { message } => assert!(message.contains("max_attempts")),
        other => panic!("expected InvalidMiddlewareStack, got {other:?}"),
    }
}

#[test]
fn zero_capacity_cache_is_rejected() {
    let cfg = CacheConfig {
        max_entries: 0,
        ..CacheConfig::default()
    };
    let res = ConnectorBuilder::new(raw()).with_cache(&cfg).build();
    assert!(matches!(res, Err(LensError::InvalidMiddlewareStack { .. })));
}

struct Passthrough;

impl Middleware for Passthrough {
    fn apply(self: Box<Self>, inner: Arc<dyn MarketConnector>) -> Arc<dyn MarketConnector> {
        inner
    }

    fn name(&self) -> &'static str {
        "Passthrough"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

#[test]
fn duplicate_custom_layers_are_rejected() {
    let res = ConnectorBuilder::new(raw())
        .layer(Passthrough)
        .layer(Passthrough)
        .build();
    assert!(matches!(res, Err(LensError::InvalidMiddlewareStack { .. })));
}

#[test]
fn replacing_a_layer_keeps_one_copy() {
    let builder = ConnectorBuilder::new(raw())
        .with_cache(&CacheConfig::default())
        .with_cache(&CacheConfig::default())
        .without_retry();
    assert_eq!(builder.layer_names().len(), 2);
    assert!(builder.build().is_ok());
}
