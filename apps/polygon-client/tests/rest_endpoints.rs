//! REST endpoint tests against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use polygon_client::infrastructure::rest::{Direction, Timespan, options, reference, stocks};
use polygon_client::{ApiKey, QueryOptions, RestClient, RestError, RestSettings};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> RestClient {
    let settings = RestSettings {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    };
    RestClient::new(&ApiKey::new("test-key").unwrap(), &settings).unwrap()
}

#[tokio::test]
async fn ticker_details_without_options_sends_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/AAPL"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": {"ticker": "AAPL", "name": "Apple Inc."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = reference::ticker_details(&client(&server), "AAPL", &QueryOptions::new())
        .await
        .unwrap();
    assert_eq!(body["results"]["name"], "Apple Inc.");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn ticker_details_forwards_only_accepted_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/AAPL"))
        .and(query_param("date", "2023-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let options = QueryOptions::new()
        .with("date", "2023-01-01")
        .with("unsupported", "x")
        .with_opt::<&str>("limit", None);
    reference::ticker_details(&client(&server), "AAPL", &options)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("date=2023-01-01"));
}

#[tokio::test]
async fn aggregates_interpolate_path_and_keep_option_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/aggs/ticker/AAPL/range/5/minute/2024-01-02/2024-01-03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resultsCount": 0})))
        .mount(&server)
        .await;

    let options = QueryOptions::new()
        .with("sort", "desc")
        .with("adjusted", true)
        .with("limit", 500);
    let body = stocks::aggregates(
        &client(&server),
        "AAPL",
        5,
        Timespan::Minute,
        "2024-01-02",
        "2024-01-03",
        &options,
    )
    .await
    .unwrap();
    assert_eq!(body["resultsCount"], 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("sort=desc&adjusted=true&limit=500")
    );
}

#[tokio::test]
async fn prefixed_tickers_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/snapshot/options/SPY/O%3ASPY251219C00650000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    options::contract_snapshot(
        &client(&server),
        "SPY",
        "O:SPY251219C00650000",
        &QueryOptions::new(),
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.path(),
        "/v3/snapshot/options/SPY/O%3ASPY251219C00650000"
    );
}

#[tokio::test]
async fn gainers_snapshot_uses_direction_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/snapshot/locale/us/markets/stocks/gainers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tickers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let body = stocks::snapshot_direction(&client(&server), Direction::Gainers, &QueryOptions::new())
        .await
        .unwrap();
    assert_eq!(body["tickers"], json!([]));
}

#[tokio::test]
async fn error_status_surfaces_vendor_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "NOT_FOUND",
            "request_id": "abc",
            "message": "Ticker not found."
        })))
        .mount(&server)
        .await;

    let err = reference::ticker_details(&client(&server), "NOPE", &QueryOptions::new())
        .await
        .unwrap_err();
    match err {
        RestError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Ticker not found.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn error_status_without_json_keeps_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/marketstatus/now"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = reference::market_status(&client(&server), &QueryOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/reference/exchanges"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = reference::exchanges(&client(&server), &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::Decode(_)));
}
