use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SettingsSaveResponse};
use crate::models::{Settings, SettingsRequest};
use crate::services::Overview;

/// `GET /api/settings`
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Settings>>, ApiError> {
    let settings = state.shared.settings_service.current().await?;
    Ok(Json(ApiResponse::success(settings)))
}

/// `PUT /api/settings`
///
/// Changed settings are only stored after the monitor accepted them; a
/// refusal answers 502 with the monitor's message.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<ApiResponse<SettingsSaveResponse>>, ApiError> {
    let settings = payload.into_settings().map_err(|e| ApiError::validation(e.to_string()))?;
    let outcome = state.shared.settings_service.save(settings).await?;

    Ok(Json(ApiResponse::success(SettingsSaveResponse {
        saved: outcome.is_saved(),
        notice: outcome.notice(),
    })))
}

/// `GET /api/overview`
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Overview>>, ApiError> {
    let overview = state
        .shared
        .overview_service
        .overview(chrono::Utc::now())
        .await?;

    Ok(Json(ApiResponse::success(overview)))
}
