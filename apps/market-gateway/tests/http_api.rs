//! HTTP surface tests.
//!
//! Requests go through the axum router end to end with in-memory providers.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use market_gateway::{AppState, CALLER_HEADER, Credentials, RouterConfig, create_router};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{FakeFallback, FakePrimary, build_router, creds, stock_quote};

fn app(
    primary: Arc<FakePrimary>,
    fallback: Arc<FakeFallback>,
    default_credentials: Option<Credentials>,
) -> Router {
    let router = build_router(primary, fallback, default_credentials, RouterConfig::default());
    create_router(AppState {
        router: Arc::new(router),
        version: "0.1.0-test".to_string(),
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn health_check_reports_version() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        None,
    );

    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], "0.1.0-test");
}

#[tokio::test]
async fn quotes_are_tagged_live() {
    let primary = Arc::new(FakePrimary::with_quotes(vec![stock_quote("AAPL", 190.0, 188.0)]));
    let app = app(primary, Arc::new(FakeFallback::default()), Some(creds()));

    let (status, body) = send(app, get("/api/v1/quotes?symbols=aapl")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provenance"], "live");
    assert_eq!(body["data"]["AAPL"]["lastPrice"], 190.0);
    assert_eq!(body["data"]["AAPL"]["assetType"], "stock");
    assert!(body.get("note").is_none());
}

#[tokio::test]
async fn anonymous_quotes_are_tagged_delayed() {
    let fallback = Arc::new(FakeFallback::with_quotes(vec![stock_quote("AAPL", 189.0, 188.0)]));
    let app = app(Arc::new(FakePrimary::default()), fallback, None);

    let (status, body) = send(app, get("/api/v1/quotes?symbols=AAPL")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provenance"], "delayed");
    assert_eq!(body["data"]["AAPL"]["delayed"], true);
}

#[tokio::test]
async fn empty_symbol_list_is_rejected() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );

    let (status, body) = send(app, get("/api/v1/quotes?symbols=,,")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("symbol"));
}

#[tokio::test]
async fn account_without_credentials_returns_hint() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        None,
    );

    let (status, body) = send(app, get("/api/v1/account")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Credentials required for account");
    assert!(body["hint"].as_str().unwrap().contains("credentials"));
}

#[tokio::test]
async fn bad_bars_query_is_rejected() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );

    let (status, body) = send(app, get("/api/v1/bars?symbol=AAPL&timeframe=3Days")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn submit_order_accepts_string_decimals() {
    let primary = Arc::new(FakePrimary::default());
    let app = app(
        Arc::clone(&primary),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );
    let order = json!({
        "symbol": "aapl",
        "qty": "1.5",
        "side": "buy",
        "type": "limit",
        "limitPrice": "189.25"
    });

    let (status, body) = send(app, post_json("/api/v1/orders", &order)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provenance"], "live");
    assert_eq!(body["data"]["symbol"], "AAPL");
    assert_eq!(body["data"]["status"], "accepted");
    assert_eq!(primary.call_count("submit_order"), 1);
}

#[tokio::test]
async fn malformed_order_body_is_rejected() {
    let primary = Arc::new(FakePrimary::default());
    let app = app(
        Arc::clone(&primary),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );

    let (status, _) = send(app, post_json("/api/v1/orders", &json!({"symbol": "AAPL"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(primary.call_count("submit_order"), 0);
}

#[tokio::test]
async fn limit_order_without_price_is_rejected() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );
    let order = json!({"symbol": "AAPL", "qty": "1", "side": "buy", "type": "limit"});

    let (status, body) = send(app, post_json("/api/v1/orders", &order)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("limit price"));
}

#[tokio::test]
async fn cancel_order_acknowledges() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/orders/order-9")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orderId"], "order-9");
    assert_eq!(body["data"]["cancelled"], true);
}

#[tokio::test]
async fn envelope_dispatches_on_action() {
    let primary = Arc::new(FakePrimary::with_quotes(vec![stock_quote("MSFT", 400.0, 390.0)]));
    let app = app(primary, Arc::new(FakeFallback::default()), Some(creds()));

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/gateway",
            &json!({"action": "quotes", "symbols": ["msft"]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["MSFT"]["lastPrice"], 400.0);
}

#[tokio::test]
async fn envelope_rejects_unknown_action() {
    let app = app(
        Arc::new(FakePrimary::default()),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );

    let (status, _) = send(
        app,
        post_json("/api/v1/gateway", &json!({"action": "withdraw"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn caller_header_scopes_account_views() {
    let primary = Arc::new(FakePrimary::default());
    let app = app(
        Arc::clone(&primary),
        Arc::new(FakeFallback::default()),
        Some(creds()),
    );
    let as_caller = |caller: &str| {
        Request::builder()
            .uri("/api/v1/positions")
            .header(CALLER_HEADER, caller)
            .body(Body::empty())
            .unwrap()
    };

    let (_, first) = send(app.clone(), as_caller("alice")).await;
    let (_, second) = send(app.clone(), as_caller("alice")).await;
    let (_, other) = send(app, as_caller("bob")).await;

    assert_eq!(first["provenance"], "live");
    assert_eq!(second["provenance"], "cached");
    assert_eq!(other["provenance"], "live");
    assert_eq!(primary.call_count("positions"), 2);
}

#[tokio::test]
async fn upstream_rejection_is_bad_gateway() {
    let primary = Arc::new(FakePrimary::default());
    primary.fail_with(market_gateway::ProviderError::Upstream {
        status: 403,
        body: "insufficient buying power".into(),
    });
    let app = app(primary, Arc::new(FakeFallback::default()), Some(creds()));
    let order = json!({"symbol": "AAPL", "qty": "10", "side": "buy", "type": "market"});

    let (status, body) = send(app, post_json("/api/v1/orders", &order)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("insufficient buying power"));
}
