use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::SettingsError;

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    ExternalApiError { service: String, message: String },

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                // The administrator needs the monitor's own words.
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Error! {service} response: {message}"),
                )
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Invalid(e) => Self::validation(e.to_string()),
            SettingsError::Transport(message) | SettingsError::RemoteRejected(message) => {
                Self::monitor_error(message)
            }
            SettingsError::Storage(msg) => Self::internal(msg),
        }
    }
}

impl ApiError {
    pub fn monitor_error(msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: "Monitor".to_string(),
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
