use axum::{Json, body::Bytes, extract::State, http::Method};
use std::sync::Arc;
use tracing::info;

use super::{AppState, StatusResponse};

/// `POST /{endpoint_slug}` with form field `pwd`.
///
/// Always answers 200; failures travel in the `error` field because the
/// monitor only inspects the body.
pub async fn handle_status_request(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Json<StatusResponse> {
    let pwd = form_field(&body, "pwd");

    let result = state
        .shared
        .status_service
        .handle(&method, pwd.as_deref(), chrono::Utc::now())
        .await;

    match result {
        Ok(report) => {
            metrics::counter!("status_requests_total", "outcome" => "ok").increment(1);
            info!(count = report.count, "Reported order count to monitor");
            Json(StatusResponse::Count {
                count: report.count,
            })
        }
        Err(e) => {
            metrics::counter!("status_requests_total", "outcome" => e.outcome()).increment(1);
            info!(method = %method, error = %e, "Status request refused");
            Json(StatusResponse::Error {
                error: e.to_string(),
            })
        }
    }
}

fn form_field(body: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
