use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::Store;
use crate::domain::Health;
use crate::models::Settings;
use crate::services::order_source::{OrderSource, count_or_zero};
use crate::services::settings_service::{SettingsError, SettingsService};

/// Everything the admin page shows besides the form itself.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub settings: Settings,
    pub window_label: String,
    pub order_count: u32,
    pub health: Health,
    pub integration_available: bool,
    pub last_accessed: Option<DateTime<Utc>>,
    pub last_accessed_display: Option<String>,
    /// Polled within the expected interval.
    pub last_accessed_fresh: bool,
}

/// Falls back to RFC 3339 when the configured format is invalid.
fn format_timestamp(at: DateTime<Utc>, format: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        return at.to_rfc3339();
    }
    out
}

pub struct OverviewService {
    store: Store,
    orders: Arc<dyn OrderSource>,
    settings: Arc<SettingsService>,
    expected_access_interval: Duration,
    date_format: String,
}

impl OverviewService {
    #[must_use]
    pub fn new(
        store: Store,
        orders: Arc<dyn OrderSource>,
        settings: Arc<SettingsService>,
        expected_access_interval_minutes: i64,
        date_format: &str,
    ) -> Self {
        Self {
            store,
            orders,
            settings,
            expected_access_interval: Duration::minutes(expected_access_interval_minutes),
            date_format: date_format.to_string(),
        }
    }

    pub async fn overview(&self, now: DateTime<Utc>) -> Result<Overview, SettingsError> {
        let settings = self.settings.current().await?;
        let last_accessed = self.store.get_last_accessed().await?;

        let integration_available = self.orders.is_available().await;
        let order_count = if integration_available {
            count_or_zero(self.orders.as_ref(), settings.window, now).await
        } else {
            0
        };

        Ok(Overview {
            window_label: settings.window.summary_label(),
            health: Health::evaluate(order_count, settings.threshold),
            order_count,
            integration_available,
            last_accessed_display: last_accessed.map(|at| format_timestamp(at, &self.date_format)),
            last_accessed_fresh: last_accessed
                .is_some_and(|at| now - at <= self.expected_access_interval),
            last_accessed,
            settings,
        })
    }
}
