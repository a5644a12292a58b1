use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::monitor::{ACTIVATE_PATH, USER_AGENT};
use crate::models::{Settings, SiteIdentity};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The monitor answered with an error or a non-200 status.
    #[error("{0}")]
    Rejected(String),
}

/// Body posted to the activation endpoint: the settings fields followed by
/// the site identity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationPayload {
    #[serde(flatten)]
    pub settings: Settings,
    pub site_domain: String,
    pub script_url: String,
    pub site_url: String,
    pub secret_token: String,
    pub plugin_version: String,
}

impl ActivationPayload {
    #[must_use]
    pub fn new(
        settings: Settings,
        identity: &SiteIdentity,
        secret_token: String,
        plugin_version: &str,
    ) -> Self {
        Self {
            settings,
            site_domain: identity.site_domain.clone(),
            script_url: identity.script_url.clone(),
            site_url: identity.site_url.clone(),
            secret_token,
            plugin_version: plugin_version.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ActivationReply {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Falsy JSON values (null, false, "", "0", 0) count as absent.
fn reply_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() || s == "0" => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Client for the external sales health monitoring service.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    client: Client,
    base_url: String,
}

impl MonitorClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build monitor HTTP client: {e}"))?;

        Ok(Self::with_shared_client(client, base_url))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Registers the site with the monitor. Returns the monitor's message on
    /// acceptance.
    pub async fn activate(&self, payload: &ActivationPayload) -> Result<String, ActivationError> {
        let url = self.api_url(ACTIVATE_PATH);
        debug!("Posting activation for {} to {}", payload.site_domain, url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!("Activation request failed: {}", e);
                ActivationError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ActivationError::Transport(e.to_string()))?;

        let reply: ActivationReply = serde_json::from_str(&body).unwrap_or_default();

        if let Some(error) = reply_text(reply.error) {
            warn!("Monitor rejected activation ({}): {}", status, error);
            return Err(ActivationError::Rejected(error));
        }

        if status != StatusCode::OK {
            warn!("Monitor answered activation with status {}", status);
            return Err(ActivationError::Rejected(format!(
                "Unknown error ({})",
                status.as_u16()
            )));
        }

        let message = reply_text(reply.message).unwrap_or_default();
        info!("Monitor accepted activation: {}", message);
        Ok(message)
    }
}
