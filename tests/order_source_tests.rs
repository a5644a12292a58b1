mod common;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use chrono::{TimeZone, Utc};
use common::closed_port_url;
use sales_health_monitor::{
    clients::WooCommerceClient,
    models::TimeWindow,
    services::{OrderSource, RestOrderSource},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Captured {
    query: Arc<Mutex<Option<String>>>,
    authorization: Arc<Mutex<Option<String>>>,
}

impl Captured {
    fn query_pairs(&self) -> HashMap<String, String> {
        let raw = self.query.lock().unwrap().clone().unwrap_or_default();
        url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect()
    }

    fn authorization(&self) -> Option<String> {
        self.authorization.lock().unwrap().clone()
    }
}

/// Local WooCommerce REST stand-in answering with `order_count` orders.
async fn spawn_shop(order_count: u64) -> (String, Captured) {
    let captured = Captured::default();

    let orders = move |State(captured): State<Captured>,
                       headers: HeaderMap,
                       RawQuery(query): RawQuery| async move {
        *captured.query.lock().unwrap() = query;
        *captured.authorization.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body: Vec<Value> = (1..=order_count)
            .map(|id| json!({ "id": id, "status": "completed" }))
            .collect();
        Json(body)
    };

    let app = Router::new()
        .route(
            "/wp-json/wc/v3",
            get(|| async { (StatusCode::OK, Json(json!({ "namespace": "wc/v3" }))) }),
        )
        .route("/wp-json/wc/v3/orders", get(orders))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), captured)
}

fn rest_source(base_url: &str) -> RestOrderSource {
    RestOrderSource::new(WooCommerceClient::new(base_url, "ck", "cs", 5).unwrap())
}

#[tokio::test]
async fn test_rest_source_query_shape() {
    let (url, captured) = spawn_shop(3).await;
    let source = rest_source(&url);
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

    assert!(source.is_available().await);
    assert_eq!(
        source
            .count_recent_orders(TimeWindow::OneDay, now)
            .await
            .unwrap(),
        3
    );

    let pairs = captured.query_pairs();
    assert_eq!(pairs["after"], "2026-10-17T12:00:00Z");
    assert_eq!(pairs["dates_are_gmt"], "true");
    assert_eq!(pairs["status"], "completed,processing");
    assert_eq!(pairs["per_page"], "100");

    // base64("ck:cs")
    assert_eq!(captured.authorization().as_deref(), Some("Basic Y2s6Y3M="));
}

#[tokio::test]
async fn test_rest_source_saturates_at_page_size() {
    let (url, _captured) = spawn_shop(120).await;
    let source = rest_source(&url);

    assert_eq!(
        source
            .count_recent_orders(TimeWindow::OneWeek, Utc::now())
            .await
            .unwrap(),
        100
    );
}

#[tokio::test]
async fn test_rest_source_unreachable() {
    let url = closed_port_url().await;
    let source = rest_source(&url);

    assert!(!source.is_available().await);
    assert!(
        source
            .count_recent_orders(TimeWindow::OneDay, Utc::now())
            .await
            .is_err()
    );
}
