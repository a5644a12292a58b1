#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    routing::post,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use sales_health_monitor::{
    api::{self, AppState},
    config::{Config, OrderSourceKind},
    models::TimeWindow,
    services::{OrderSource, OrderSourceError},
    state::SharedState,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tower::ServiceExt;

pub const SITE_URL: &str = "https://shop.example.com";
pub const ENDPOINT: &str = "/itg-sales-health-monitor-endpoint";

/// Order source with a fixed answer.
pub struct FixedOrders {
    pub available: bool,
    pub count: u32,
}

#[async_trait]
impl OrderSource for FixedOrders {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn count_recent_orders(
        &self,
        _window: TimeWindow,
        _now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        Ok(self.count)
    }
}

/// Answers with the window length in hours, so tests can see which window
/// was asked for.
pub struct WindowEcho;

#[async_trait]
impl OrderSource for WindowEcho {
    fn name(&self) -> &'static str {
        "window-echo"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn count_recent_orders(
        &self,
        window: TimeWindow,
        _now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        Ok(window.hours())
    }
}

pub struct FailingOrders;

#[async_trait]
impl OrderSource for FailingOrders {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn count_recent_orders(
        &self,
        _window: TimeWindow,
        _now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        Err(OrderSourceError::Api("connection reset".to_string()))
    }
}

/// Fixed count that records how often availability was checked.
#[derive(Default)]
pub struct CountingOrders {
    pub availability_checks: AtomicUsize,
}

impl CountingOrders {
    pub fn checks(&self) -> usize {
        self.availability_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderSource for CountingOrders {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn is_available(&self) -> bool {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        true
    }

    async fn count_recent_orders(
        &self,
        _window: TimeWindow,
        _now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        Ok(6)
    }
}

/// Local stand-in for the remote monitoring service.
pub struct FakeMonitor {
    pub url: String,
    pub calls: Arc<AtomicUsize>,
    pub last_payload: Arc<Mutex<Option<Value>>>,
}

impl FakeMonitor {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.last_payload.lock().unwrap().clone()
    }
}

pub async fn spawn_monitor(status: StatusCode, reply: Value) -> FakeMonitor {
    let calls = Arc::new(AtomicUsize::new(0));
    let last_payload = Arc::new(Mutex::new(None));

    let handler_calls = calls.clone();
    let handler_payload = last_payload.clone();
    let app = Router::new().route(
        "/api/activate",
        post(move |Json(payload): Json<Value>| {
            let calls = handler_calls.clone();
            let last = handler_payload.clone();
            let reply = reply.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap() = Some(payload);
                (status, Json(reply))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeMonitor {
        url: format!("http://{addr}"),
        calls,
        last_payload,
    }
}

/// URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn test_config(monitor_url: &str) -> (Config, PathBuf) {
    let db_path = std::env::temp_dir().join(format!("shm-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.site.url = SITE_URL.to_string();
    config.site.admin_email = "owner@example.com".to_string();
    config.monitor.server_url = monitor_url.to_string();
    config.monitor.request_timeout_seconds = 2;
    config.orders.source = OrderSourceKind::None;
    config.observability.metrics_enabled = false;

    (config, db_path)
}

pub async fn spawn_app_with(config: Config, db_path: PathBuf, orders: Arc<dyn OrderSource>) -> TestApp {
    let shared = SharedState::with_order_source(config, orders)
        .await
        .expect("Failed to create shared state");
    let state = api::create_app_state(Arc::new(shared), None);

    TestApp {
        router: api::router(state.clone()),
        state,
        db_path,
    }
}

pub async fn spawn_app(monitor_url: &str, orders: Arc<dyn OrderSource>) -> TestApp {
    let (config, db_path) = test_config(monitor_url);
    spawn_app_with(config, db_path, orders).await
}

impl TestApp {
    pub async fn secret_token(&self) -> String {
        self.state.store().get_secret_token().await.unwrap().unwrap()
    }

    pub async fn admin_key(&self) -> String {
        self.state.store().get_admin_key().await.unwrap().unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_status(&self, body: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(ENDPOINT)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn put_settings(&self, body: Value) -> Response {
        let key = self.admin_key().await;
        self.send(
            Request::builder()
                .method("PUT")
                .uri("/api/settings")
                .header("X-Api-Key", key)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_admin(&self, uri: &str) -> Response {
        let key = self.admin_key().await;
        self.send(
            Request::builder()
                .uri(uri)
                .header("X-Api-Key", key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
