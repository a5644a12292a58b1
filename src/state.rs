use std::sync::Arc;

use crate::clients::MonitorClient;
use crate::config::Config;
use crate::db::Store;
use crate::models::{Settings, SiteIdentity};
use crate::services::{
    OrderSource, OverviewService, SettingsService, StatusService, build_order_source,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub orders: Arc<dyn OrderSource>,

    pub settings_service: Arc<SettingsService>,

    pub status_service: Arc<StatusService>,

    pub overview_service: Arc<OverviewService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let orders =
            build_order_source(&config.orders, config.monitor.request_timeout_seconds).await?;
        Self::with_order_source(config, orders).await
    }

    /// Builds the state around an already constructed order source.
    pub async fn with_order_source(
        config: Config,
        orders: Arc<dyn OrderSource>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        store.ensure_secret_token().await?;
        store.ensure_admin_key().await?;

        let identity = SiteIdentity::from_config(&config.site)?;
        let monitor = Arc::new(MonitorClient::new(
            &config.monitor.server_url,
            config.monitor.request_timeout_seconds,
        )?);

        let settings_service = Arc::new(SettingsService::new(
            store.clone(),
            monitor,
            identity,
            Settings::defaults(&config.site.admin_email),
        ));

        let status_service = Arc::new(StatusService::new(
            store.clone(),
            orders.clone(),
            settings_service.clone(),
        ));

        let overview_service = Arc::new(OverviewService::new(
            store.clone(),
            orders.clone(),
            settings_service.clone(),
            config.monitor.expected_access_interval_minutes,
            &config.site.date_format,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            orders,
            settings_service,
            status_service,
            overview_service,
        })
    }
}
