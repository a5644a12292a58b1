use anyhow::{Context, Result};
use url::Url;

use crate::config::SiteConfig;

/// How this installation identifies itself to the monitoring service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    pub site_url: String,
    pub site_domain: String,
    /// Absolute URL of the status endpoint the monitor should poll.
    pub script_url: String,
}

impl SiteIdentity {
    pub fn from_config(site: &SiteConfig) -> Result<Self> {
        let site_url = site.url.trim().trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&site_url).with_context(|| format!("Invalid site URL: {site_url}"))?;
        let site_domain = parsed
            .host_str()
            .with_context(|| format!("Site URL has no host: {site_url}"))?
            .to_string();
        let script_url = format!("{site_url}/{}", site.endpoint_slug.trim());

        Ok(Self {
            site_url,
            site_domain,
            script_url,
        })
    }
}
