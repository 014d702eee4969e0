//! End-to-end tests over the axum router: trade lifecycle, filtering,
//! portfolio aggregation, risk metrics, and the prices API, all against an
//! in-memory store and the offline mock quote provider.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tradelog_backend::app::create_app;
use tradelog_backend::external::mock::MockProvider;
use tradelog_backend::services::price_cache::PriceCache;
use tradelog_backend::state::AppState;
use tradelog_backend::store::key_value::MemoryStore;
use tradelog_backend::store::trade_store::TradeStore;

fn test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        trades: Arc::new(TradeStore::new(store.clone())),
        prices: Arc::new(PriceCache::new(store, Arc::new(MockProvider), 300)),
    };
    create_app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_check_is_alive() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn trade_lifecycle_buy_sell_delete() {
    let app = test_app();

    let (status, trade) = send(
        &app,
        "POST",
        "/api/trades",
        Some(json!({
            "symbol": "aapl",
            "quantity": 10,
            "buy_price": 100.0,
            "buy_date": "2024-01-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(trade["symbol"], "AAPL");
    assert_eq!(trade["status"], "open");
    let id = trade["id"].as_str().unwrap().to_string();

    let (status, closed) = send(
        &app,
        "POST",
        &format!("/api/trades/{}/sell", id),
        Some(json!({ "sell_price": 120.0, "sell_date": "2024-02-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");
    assert_eq!(closed["sell_price"], 120.0);

    // selling twice is rejected
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/trades/{}/sell", id),
        Some(json!({ "sell_price": 130.0, "sell_date": "2024-02-03" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send(&app, "GET", "/api/trades?closed_only=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total_count"], 1);
    assert_eq!(list["total_gain"], 200.0);
    assert_eq!(list["trades"][0]["gain_percentage"], 20.0);

    let (status, _) = send(&app, "DELETE", &format!("/api/trades/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/trades/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_a_bad_request() {
    let app = test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/trades",
        Some(json!({
            "symbol": "AAPL",
            "quantity": 0,
            "buy_price": 100.0,
            "buy_date": "2024-01-02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // mutually exclusive filter flags
    let (status, _) = send(
        &app,
        "GET",
        "/api/trades?open_only=true&closed_only=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn portfolio_summary_splits_realized_and_unrealized() {
    let app = test_app();

    let (_, trade) = send(
        &app,
        "POST",
        "/api/trades",
        Some(json!({
            "symbol": "AAPL",
            "quantity": 10,
            "buy_price": 100.0,
            "buy_date": "2024-01-02"
        })),
    )
    .await;
    let id = trade["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        &format!("/api/trades/{}/sell", id),
        Some(json!({ "sell_price": 120.0, "sell_date": "2024-02-02" })),
    )
    .await;

    // open trade with no cached price contributes nothing unrealized
    send(
        &app,
        "POST",
        "/api/trades",
        Some(json!({
            "symbol": "MSFT",
            "quantity": 5,
            "buy_price": 300.0,
            "buy_date": "2024-02-10"
        })),
    )
    .await;

    let (status, summary) = send(&app, "GET", "/api/portfolio/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_trades"], 2);
    assert_eq!(summary["open_trades"], 1);
    assert_eq!(summary["closed_trades"], 1);
    assert_eq!(summary["realized_gain"], 200.0);
    assert_eq!(summary["unrealized_gain"], 0.0);
    assert_eq!(summary["total_gain"], 200.0);
    assert_eq!(summary["total_investment"], 2500.0);

    let (status, symbols) = send(&app, "GET", "/api/portfolio/symbols", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(symbols.as_array().unwrap().len(), 2);
    assert_eq!(symbols[0]["symbol"], "AAPL");
    assert_eq!(symbols[0]["win_rate"], 100.0);

    let (_, best) = send(&app, "GET", "/api/portfolio/symbols/best?limit=1", None).await;
    assert_eq!(best.as_array().unwrap().len(), 1);
    assert_eq!(best[0]["symbol"], "AAPL");
}

#[tokio::test]
async fn risk_endpoint_returns_neutral_defaults() {
    let app = test_app();

    let (status, metrics) = send(
        &app,
        "POST",
        "/api/portfolio/risk",
        Some(json!({
            "returns": [0.1, 0.1, 0.1, 0.1],
            "values": [100.0, 80.0, 120.0, 60.0]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["volatility"], 0.0);
    assert_eq!(metrics["max_drawdown"], 50.0);
    // no market series supplied
    assert_eq!(metrics["beta"], 1.0);
}

#[tokio::test]
async fn prices_api_round_trip_and_invalidate() {
    let app = test_app();

    let (status, prices) = send(
        &app,
        "POST",
        "/api/prices/refresh",
        Some(json!({ "symbols": ["AAPL", "MSFT", "aapl"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let map = prices.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert!(map.contains_key("AAPL"));
    assert!(map.contains_key("MSFT"));

    let (status, cached) = send(&app, "GET", "/api/prices/AAPL/cached", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["symbol"], "AAPL");

    let (status, _) = send(&app, "DELETE", "/api/prices", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/prices/AAPL/cached", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
