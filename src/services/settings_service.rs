//! Settings persistence gated by the remote activation handshake.
//!
//! A save that changes anything must first be accepted by the monitoring
//! service; if the monitor cannot be reached or refuses, the stored settings
//! stay as they were.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clients::{ActivationError, ActivationPayload, MonitorClient};
use crate::constants::PLUGIN_VERSION;
use crate::db::Store;
use crate::models::{Notice, Settings, SettingsInputError, SiteIdentity};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Invalid(#[from] SettingsInputError),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    RemoteRejected(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for SettingsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<ActivationError> for SettingsError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::Transport(msg) => Self::Transport(msg),
            ActivationError::Rejected(msg) => Self::RemoteRejected(msg),
        }
    }
}

impl SettingsError {
    /// Notice shown to the administrator for a rejected save.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Transport(msg) | Self::RemoteRejected(msg) => {
                Notice::error(format!("Error! Monitor response: {msg}"))
            }
            Self::Invalid(e) => Notice::error(format!("Error! {e}")),
            Self::Storage(_) => Notice::error("Error! Settings could not be stored."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Identical to what was stored; the monitor was not contacted.
    Unchanged,
    Saved { monitor_message: String },
}

impl SaveOutcome {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Unchanged => None,
            Self::Saved { monitor_message } => Some(Notice::updated(format!(
                "Settings saved successfully! Monitor response: {monitor_message}"
            ))),
        }
    }
}

pub struct SettingsService {
    store: Store,
    monitor: Arc<MonitorClient>,
    identity: SiteIdentity,
    defaults: Settings,
    save_lock: Mutex<()>,
}

impl SettingsService {
    #[must_use]
    pub fn new(
        store: Store,
        monitor: Arc<MonitorClient>,
        identity: SiteIdentity,
        defaults: Settings,
    ) -> Self {
        Self {
            store,
            monitor,
            identity,
            defaults,
            save_lock: Mutex::new(()),
        }
    }

    /// Stored settings, falling back to defaults when never saved.
    pub async fn current(&self) -> Result<Settings, SettingsError> {
        Ok(self
            .store
            .get_settings()
            .await?
            .unwrap_or_else(|| self.defaults.clone()))
    }

    pub async fn save(&self, new_settings: Settings) -> Result<SaveOutcome, SettingsError> {
        let _guard = self.save_lock.lock().await;

        let stored = self.store.get_settings().await?;
        if stored.as_ref() == Some(&new_settings) {
            return Ok(SaveOutcome::Unchanged);
        }

        let secret_token = self.store.ensure_secret_token().await?;
        let payload = ActivationPayload::new(
            new_settings.clone(),
            &self.identity,
            secret_token,
            PLUGIN_VERSION,
        );

        let monitor_message = match self.monitor.activate(&payload).await {
            Ok(message) => {
                metrics::counter!("activation_attempts_total", "outcome" => "accepted")
                    .increment(1);
                message
            }
            Err(e) => {
                let outcome = match e {
                    ActivationError::Transport(_) => "transport_failure",
                    ActivationError::Rejected(_) => "rejected",
                };
                metrics::counter!("activation_attempts_total", "outcome" => outcome).increment(1);
                warn!("Settings save rejected: {}", e);
                return Err(e.into());
            }
        };

        self.store.put_settings(&new_settings).await?;
        info!(
            enabled = new_settings.enabled,
            threshold = new_settings.threshold,
            window_hours = new_settings.window.hours(),
            "Settings saved"
        );

        Ok(SaveOutcome::Saved { monitor_message })
    }
}
