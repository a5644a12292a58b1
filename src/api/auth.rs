use axum::{
    extract::{Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};

#[derive(Deserialize)]
pub struct AuthQuery {
    pub api_key: Option<String>,
}

/// Guards the admin surface. The admin key is accepted from:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <key>` header
/// 3. `?api_key=` query parameter, only when enabled in config
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let allow_query = state.config().server.allow_api_key_in_query;
    let Some(provided) = extract_api_key(&query, &headers, allow_query) else {
        return Err(ApiError::Unauthorized("Missing admin key".to_string()));
    };

    let expected = state
        .store()
        .get_admin_key()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read admin key: {e}")))?;

    if expected.as_deref() == Some(provided.as_str()) {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::Unauthorized("Invalid admin key".to_string()))
    }
}

fn extract_api_key(query: &AuthQuery, headers: &HeaderMap, allow_query: bool) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    if allow_query {
        return query.api_key.clone().filter(|k| !k.is_empty());
    }

    None
}
