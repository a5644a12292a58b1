use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::constants::monitor::USER_AGENT;

#[derive(Debug, Clone, Deserialize)]
pub struct WooOrder {
    pub id: u64,

    pub status: String,

    #[serde(default)]
    pub date_created_gmt: Option<String>,
}

/// Minimal WooCommerce REST (`wc/v3`) client.
#[derive(Debug, Clone)]
pub struct WooCommerceClient {
    client: Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl WooCommerceClient {
    pub fn new(
        base_url: &str,
        consumer_key: &str,
        consumer_secret: &str,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build WooCommerce HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/wp-json/wc/v3{}", self.base_url, path);
        Url::parse(&raw).with_context(|| format!("Invalid WooCommerce URL: {raw}"))
    }

    /// Whether the REST namespace answers at all.
    pub async fn ping(&self) -> Result<bool> {
        let url = self.endpoint("")?;
        let response = self
            .client
            .get(url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// Orders created strictly after `after`, at most `per_page` of them.
    pub async fn list_orders_after(
        &self,
        after: DateTime<Utc>,
        statuses: &[&str],
        per_page: u32,
    ) -> Result<Vec<WooOrder>> {
        let mut url = self.endpoint("/orders")?;
        let statuses = statuses
            .iter()
            .map(|s| s.trim_start_matches("wc-"))
            .collect::<Vec<_>>()
            .join(",");

        url.query_pairs_mut()
            .append_pair("after", &after.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("dates_are_gmt", "true")
            .append_pair("status", &statuses)
            .append_pair("per_page", &per_page.to_string());

        debug!("Fetching WooCommerce orders after {}", after);

        let orders = self
            .client
            .get(url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<WooOrder>>()
            .await?;

        Ok(orders)
    }
}
