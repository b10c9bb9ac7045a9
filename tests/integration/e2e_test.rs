//! End-to-end tests: sources through the scheduler to the HTTP endpoint

use super::StubSource;
use cross_rate_oracle::api;
use cross_rate_oracle::cache::PriceCache;
use cross_rate_oracle::scheduler::{run_once, Scheduler};
use cross_rate_oracle::source::{FetchError, RateKind};
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_scheduler_fills_cache_at_startup() {
    let cache = Arc::new(PriceCache::new());
    let token = Arc::new(StubSource::new(RateKind::TokenToUsd, dec!(0.02)));
    let fiat = Arc::new(StubSource::new(RateKind::UsdToFiat, dec!(36.5)));

    // Intervals far longer than the test: only the startup tick runs
    let handle = Scheduler::new(cache.clone())
        .with_job(token, Duration::from_secs(3600))
        .with_job(fiat, Duration::from_secs(3600))
        .start();

    let url = super::spawn_mock(api::router(cache.clone())).await;

    let mut ready = false;
    for _ in 0..200 {
        if cache.is_ready().await {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(ready, "cache never became ready");

    let response = super::http_client().get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["crossRate"], 0.73);

    handle.shutdown();
}

#[tokio::test]
async fn test_failed_fetch_keeps_served_snapshot() {
    let cache = Arc::new(PriceCache::new());
    let token = StubSource::new(RateKind::TokenToUsd, dec!(0.02));
    let fiat = StubSource::new(RateKind::UsdToFiat, dec!(36.5));

    assert_ok!(run_once(&token, &cache).await);
    assert_ok!(run_once(&fiat, &cache).await);
    let primed = cache.snapshot().await.unwrap();

    fiat.fail_with("connection reset");
    token.fail_with("connection reset");
    let err = assert_err!(run_once(&fiat, &cache).await);
    assert!(matches!(err, FetchError::Network(_)));
    assert_err!(run_once(&token, &cache).await);

    assert_eq!(cache.snapshot().await, Some(primed.clone()));

    let url = super::spawn_mock(api::router(cache.clone())).await;
    let response = super::http_client().get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["tokenToUsd"], 0.02);
    assert_eq!(body["usdToFiat"], 36.5);
    assert_eq!(body["crossRate"], 0.73);
}

#[tokio::test]
async fn test_cross_rate_is_exact_product() {
    let cache = PriceCache::new();
    let pairs = [
        (dec!(0.02), dec!(36.5)),
        (dec!(0.01234567), dec!(35.8912)),
        (dec!(1.5), dec!(33.3333)),
    ];

    for (token, fiat) in pairs {
        cache.update(RateKind::TokenToUsd, token).await.unwrap();
        cache.update(RateKind::UsdToFiat, fiat).await.unwrap();
        let snapshot = cache.snapshot().await.unwrap();
        assert_eq!(snapshot.cross_rate, token * fiat);
    }
}

#[tokio::test]
async fn test_last_update_non_decreasing_with_wall_clock() {
    let cache = PriceCache::new();
    let mut previous = None;

    for i in 0..50 {
        let kind = if i % 2 == 0 {
            RateKind::TokenToUsd
        } else {
            RateKind::UsdToFiat
        };
        cache.update(kind, dec!(1)).await.unwrap();
        let current = cache.last_update_at().await;
        assert!(current >= previous);
        previous = current;
    }
}
