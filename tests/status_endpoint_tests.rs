mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{FailingOrders, FixedOrders, WindowEcho, body_json, closed_port_url, spawn_app, spawn_monitor};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_reports_count_for_valid_secret() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(
        &monitor_url,
        Arc::new(FixedOrders {
            available: true,
            count: 7,
        }),
    )
    .await;

    assert!(app.state.store().get_last_accessed().await.unwrap().is_none());

    let secret = app.secret_token().await;
    let response = app.post_status(&format!("pwd={secret}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "count": 7 }));
    assert!(app.state.store().get_last_accessed().await.unwrap().is_some());
}

#[tokio::test]
async fn test_secret_is_trimmed() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(
        &monitor_url,
        Arc::new(FixedOrders {
            available: true,
            count: 2,
        }),
    )
    .await;

    let secret = app.secret_token().await;
    let response = app.post_status(&format!("pwd=%20{secret}%20")).await;

    assert_eq!(body_json(response).await, json!({ "count": 2 }));
}

#[tokio::test]
async fn test_bad_credentials() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(
        &monitor_url,
        Arc::new(FixedOrders {
            available: true,
            count: 7,
        }),
    )
    .await;

    for body in ["pwd=wrong", "", "pwd="] {
        let response = app.post_status(body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "error": "Bad credentials" }));
    }

    assert!(app.state.store().get_last_accessed().await.unwrap().is_none());
}

#[tokio::test]
async fn test_non_post_is_rejected_before_credentials() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(
        &monitor_url,
        Arc::new(FixedOrders {
            available: true,
            count: 7,
        }),
    )
    .await;

    let secret = app.secret_token().await;
    let response = app
        .send(
            Request::builder()
                .method("GET")
                .uri(format!("{}?pwd={secret}", common::ENDPOINT))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Invalid request method" })
    );
    assert!(app.state.store().get_last_accessed().await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_integration_still_records_access() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(
        &monitor_url,
        Arc::new(FixedOrders {
            available: false,
            count: 0,
        }),
    )
    .await;

    let secret = app.secret_token().await;
    let response = app.post_status(&format!("pwd={secret}")).await;

    assert_eq!(
        body_json(response).await,
        json!({ "error": "WooCommerce not installed" })
    );
    assert!(app.state.store().get_last_accessed().await.unwrap().is_some());
}

#[tokio::test]
async fn test_order_query_failure_counts_zero() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(&monitor_url, Arc::new(FailingOrders)).await;

    let secret = app.secret_token().await;
    let response = app.post_status(&format!("pwd={secret}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "count": 0 }));
}

#[tokio::test]
async fn test_trailing_slash_route() {
    let monitor_url = closed_port_url().await;
    let app = spawn_app(
        &monitor_url,
        Arc::new(FixedOrders {
            available: true,
            count: 1,
        }),
    )
    .await;

    let secret = app.secret_token().await;
    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri(format!("{}/", common::ENDPOINT))
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("pwd={secret}")))
                .unwrap(),
        )
        .await;

    assert_eq!(body_json(response).await, json!({ "count": 1 }));
}

#[tokio::test]
async fn test_count_uses_saved_window() {
    let monitor = spawn_monitor(StatusCode::OK, json!({ "message": "ok" })).await;
    let app = spawn_app(&monitor.url, Arc::new(WindowEcho)).await;
    let secret = app.secret_token().await;

    let response = app.post_status(&format!("pwd={secret}")).await;
    assert_eq!(body_json(response).await, json!({ "count": 24 }));

    let response = app
        .put_settings(json!({
            "email": "shop@example.com",
            "threshold": 3,
            "hours": 168,
            "enabled": true
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post_status(&format!("pwd={secret}")).await;
    assert_eq!(body_json(response).await, json!({ "count": 168 }));
}
