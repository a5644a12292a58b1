//! The status endpoint polled by the monitoring service.

use axum::http::Method;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::db::Store;
use crate::services::order_source::{OrderSource, count_or_zero};
use crate::services::settings_service::SettingsService;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Invalid request method")]
    InvalidMethod,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("WooCommerce not installed")]
    IntegrationMissing,

    #[error("Service unavailable")]
    Storage(String),
}

impl StatusError {
    /// Label used for the request outcome metric.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidMethod => "invalid_method",
            Self::BadCredentials => "bad_credentials",
            Self::IntegrationMissing => "integration_missing",
            Self::Storage(_) => "storage_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub count: u32,
}

/// Exact comparison; an empty provided secret never matches.
fn credentials_match(stored: Option<&str>, provided: &str) -> bool {
    !provided.is_empty() && stored == Some(provided)
}

pub struct StatusService {
    store: Store,
    orders: Arc<dyn OrderSource>,
    settings: Arc<SettingsService>,
}

impl StatusService {
    #[must_use]
    pub fn new(store: Store, orders: Arc<dyn OrderSource>, settings: Arc<SettingsService>) -> Self {
        Self {
            store,
            orders,
            settings,
        }
    }

    /// Runs one status request to completion. The first failing step ends the
    /// request.
    pub async fn handle(
        &self,
        method: &Method,
        pwd: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<StatusReport, StatusError> {
        if *method != Method::POST {
            return Err(StatusError::InvalidMethod);
        }

        let stored = self
            .store
            .get_secret_token()
            .await
            .map_err(|e| StatusError::Storage(e.to_string()))?;
        let provided = pwd.map(str::trim).unwrap_or_default();
        if !credentials_match(stored.as_deref(), provided) {
            debug!("Status request with bad credentials");
            return Err(StatusError::BadCredentials);
        }

        if let Err(e) = self.store.set_last_accessed(now).await {
            error!("Failed to record last access: {}", e);
        }

        if !self.orders.is_available().await {
            return Err(StatusError::IntegrationMissing);
        }

        let window = self
            .settings
            .current()
            .await
            .map_err(|e| StatusError::Storage(e.to_string()))?
            .window;

        let count = count_or_zero(self.orders.as_ref(), window, now).await;

        Ok(StatusReport { count })
    }
}
