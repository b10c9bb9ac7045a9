//! Integration tests for the rate source clients against local mock upstreams

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use cross_rate_oracle::cache::ManualClock;
use cross_rate_oracle::config::{FiatConfig, OracleConfig};
use cross_rate_oracle::source::{
    parse_fiat_response, FetchError, FiatRateClient, OracleClient, RateSource,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn oracle_config(rpc_url: String) -> OracleConfig {
    OracleConfig {
        rpc_url,
        timeout_secs: 5,
        ..OracleConfig::default()
    }
}

fn fiat_config(api_url: String) -> FiatConfig {
    FiatConfig {
        api_url,
        client_id: "test-client".to_string(),
        timeout_secs: 5,
        ..FiatConfig::default()
    }
}

/// An address nothing listens on
async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

#[test]
fn test_fiat_parser_scenario() {
    let body = r#"{"result":{"data":{"data_detail":[{"selling":"36.55"}]}}}"#;
    assert_eq!(parse_fiat_response(body).unwrap(), dec!(36.55));
}

#[tokio::test]
async fn test_oracle_client_reads_price() {
    let router = Router::new().route(
        "/",
        post(|Json(request): Json<Value>| async move {
            assert_eq!(request["method"], "eth_call");
            Json(json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "result": format!("0x{:064x}", 2_000_000u64),
            }))
        }),
    );
    let url = super::spawn_mock(router).await;

    let client = OracleClient::new(oracle_config(format!("{}/", url))).unwrap();
    assert_eq!(client.fetch().await.unwrap(), dec!(0.02));
}

#[tokio::test]
async fn test_oracle_client_reverted_call() {
    let router = Router::new().route(
        "/",
        post(|| async {
            Json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "execution reverted" },
            }))
        }),
    );
    let url = super::spawn_mock(router).await;

    let client = OracleClient::new(oracle_config(format!("{}/", url))).unwrap();
    let result = client.fetch().await;
    assert!(matches!(result, Err(FetchError::ContractCall(_))));
}

#[tokio::test]
async fn test_oracle_client_unreachable() {
    let client = OracleClient::new(oracle_config(closed_port_url().await)).unwrap();
    let result = client.fetch().await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn test_fiat_client_sends_query_and_header() {
    let router = Router::new().route(
        "/rates",
        get(
            |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                let client_id = headers
                    .get("x-ibm-client-id")
                    .and_then(|v| v.to_str().ok());
                if client_id != Some("test-client") {
                    return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad client" })));
                }

                assert_eq!(params.get("currency").map(String::as_str), Some("USD"));
                assert_eq!(params.get("start_period"), params.get("end_period"));
                assert_eq!(params["start_period"].len(), "2024-01-15".len());

                (
                    StatusCode::OK,
                    Json(json!({
                        "result": {
                            "data": {
                                "data_detail": [
                                    { "period": params["start_period"], "selling": "36.55" }
                                ]
                            }
                        }
                    })),
                )
            },
        ),
    );
    let url = super::spawn_mock(router).await;

    let client = FiatRateClient::new(fiat_config(format!("{}/rates", url))).unwrap();
    assert_eq!(client.fetch().await.unwrap(), dec!(36.55));
}

#[tokio::test]
async fn test_fiat_client_rejected_credentials() {
    let router = Router::new().route(
        "/rates",
        get(|| async { (StatusCode::UNAUTHORIZED, "unauthorized") }),
    );
    let url = super::spawn_mock(router).await;

    let client = FiatRateClient::new(fiat_config(format!("{}/rates", url))).unwrap();
    let result = client.fetch().await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn test_fiat_client_unexpected_shape() {
    let router = Router::new().route(
        "/rates",
        get(|| async { Json(json!({ "result": { "data": {} } })) }),
    );
    let url = super::spawn_mock(router).await;

    let client = FiatRateClient::new(fiat_config(format!("{}/rates", url))).unwrap();
    let result = client.fetch().await;
    assert!(matches!(result, Err(FetchError::Parse(_))));
}

#[tokio::test]
async fn test_fiat_client_queries_yesterday_in_bangkok() {
    let router = Router::new().route(
        "/rates",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let period = params.get("start_period").cloned().unwrap_or_default();
            let selling = if period == "2024-01-15" && params.get("end_period") == Some(&period) {
                json!(36.55)
            } else {
                json!(null)
            };
            Json(json!({
                "result": { "data": { "data_detail": [ { "period": period, "selling": selling } ] } }
            }))
        }),
    );
    let url = super::spawn_mock(router).await;

    // 20:00 UTC on the 15th is already the 16th in Bangkok
    let clock = Arc::new(ManualClock::new("2024-01-15T20:00:00Z".parse().unwrap()));
    let client =
        FiatRateClient::with_clock(fiat_config(format!("{}/rates", url)), clock.clone()).unwrap();
    assert_eq!(client.fetch().await.unwrap(), dec!(36.55));

    // 10:00 UTC on the 15th is still the 15th there, so the query moves to the 14th
    clock.set("2024-01-15T10:00:00Z".parse().unwrap());
    let result = client.fetch().await;
    assert!(matches!(result, Err(FetchError::Parse(_))));
}
