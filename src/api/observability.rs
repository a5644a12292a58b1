use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// Per-request span, request metrics and a single "finished" event.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Matched route when known; unknown paths are labelled as such.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(
            || path_label(&path).to_string(),
            |mp| mp.as_str().to_string(),
        );

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status().as_u16();
        let elapsed = start.elapsed();

        let labels = [
            ("method", method),
            ("route", route),
            ("status", status.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Collapses paths outside the fixed route set into one label.
fn path_label(path: &str) -> &str {
    match path {
        "/admin" | "/api/settings" | "/api/overview" | "/api/metrics" | "/health/live"
        | "/health/ready" => path,
        _ if path.starts_with("/api/") => "/api/*",
        _ => "other",
    }
}
