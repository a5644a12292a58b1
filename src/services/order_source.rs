//! Order sources: where the recent order count comes from.
//!
//! Every source honours the same contract: only orders whose status is one of
//! [`COUNTED_STATUSES`] and whose creation time lies strictly after
//! `now - window` are counted, and the count saturates at [`QUERY_LIMIT`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, Query, SelectStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::clients::WooCommerceClient;
use crate::config::{OrderSourceKind, OrdersConfig};
use crate::constants::orders::{COUNTED_STATUSES, HPOS_OPTION, ORDER_TYPE, QUERY_LIMIT};
use crate::models::TimeWindow;

#[derive(Debug, Error)]
pub enum OrderSourceError {
    #[error("Order database error: {0}")]
    Database(#[from] DbErr),

    #[error("Order API error: {0}")]
    Api(String),
}

impl From<anyhow::Error> for OrderSourceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Api(err.to_string())
    }
}

#[async_trait]
pub trait OrderSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the commerce integration is installed and reachable.
    async fn is_available(&self) -> bool;

    async fn count_recent_orders(
        &self,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError>;
}

/// Count with availability already established: a failing query is logged
/// and counts as 0.
pub async fn count_or_zero(source: &dyn OrderSource, window: TimeWindow, now: DateTime<Utc>) -> u32 {
    match source.count_recent_orders(window, now).await {
        Ok(count) => count,
        Err(e) => {
            warn!("Failed to count orders via '{}': {}", source.name(), e);
            0
        }
    }
}

fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX).min(QUERY_LIMIT)
}

pub async fn build_order_source(
    config: &OrdersConfig,
    timeout_seconds: u64,
) -> anyhow::Result<Arc<dyn OrderSource>> {
    let source: Arc<dyn OrderSource> = match config.source {
        OrderSourceKind::Database => Arc::new(
            DatabaseOrderSource::connect(&config.database_url, &config.table_prefix).await?,
        ),
        OrderSourceKind::Rest => Arc::new(RestOrderSource::new(WooCommerceClient::new(
            &config.rest_url,
            &config.consumer_key,
            &config.consumer_secret,
            timeout_seconds,
        )?)),
        OrderSourceKind::None => Arc::new(NoOrderSource),
    };

    Ok(source)
}

/// Where WooCommerce keeps its orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderStorage {
    /// High-performance order storage, `wc_orders`.
    Hpos,
    /// Legacy `posts` rows.
    Posts,
}

impl OrderStorage {
    const fn table_suffix(self) -> &'static str {
        match self {
            Self::Hpos => "wc_orders",
            Self::Posts => "posts",
        }
    }

    /// `[id, type, status, created (GMT)]`
    const fn columns(self) -> [&'static str; 4] {
        match self {
            Self::Hpos => ["id", "type", "status", "date_created_gmt"],
            Self::Posts => ["ID", "post_type", "post_status", "post_date_gmt"],
        }
    }
}

/// Reads the shop database directly, from `wc_orders` when HPOS is enabled
/// and from `posts` otherwise.
pub struct DatabaseOrderSource {
    conn: DatabaseConnection,
    prefix: String,
}

impl DatabaseOrderSource {
    #[must_use]
    pub fn new(conn: DatabaseConnection, table_prefix: &str) -> Self {
        Self {
            conn,
            prefix: table_prefix.to_string(),
        }
    }

    /// Connects lazily enough that a shop database which is down at startup
    /// only makes the integration report as unavailable.
    pub async fn connect(database_url: &str, table_prefix: &str) -> anyhow::Result<Self> {
        let mut opt = ConnectOptions::new(database_url.to_string());
        opt.max_connections(2)
            .min_connections(0)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .connect_lazy(true)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Ok(Self::new(conn, table_prefix))
    }

    fn table(&self, storage: OrderStorage) -> String {
        format!("{}{}", self.prefix, storage.table_suffix())
    }

    /// Anything but an explicit `yes` means the legacy posts table.
    async fn storage(&self) -> OrderStorage {
        let stmt = Query::select()
            .column(Alias::new("option_value"))
            .from(Alias::new(format!("{}options", self.prefix)))
            .and_where(Expr::col(Alias::new("option_name")).eq(HPOS_OPTION))
            .limit(1)
            .to_owned();
        let backend = self.conn.get_database_backend();

        match self.conn.query_one(backend.build(&stmt)).await {
            Ok(Some(row)) => match row.try_get::<String>("", "option_value") {
                Ok(value) if value == "yes" => OrderStorage::Hpos,
                _ => OrderStorage::Posts,
            },
            Ok(None) => OrderStorage::Posts,
            Err(e) => {
                debug!("Could not read {}: {}", HPOS_OPTION, e);
                OrderStorage::Posts
            }
        }
    }

    fn recent_orders_query(&self, storage: OrderStorage, cutoff: DateTime<Utc>) -> SelectStatement {
        let [id, kind, status, created] = storage.columns();
        Query::select()
            .column(Alias::new(id))
            .from(Alias::new(self.table(storage)))
            .and_where(Expr::col(Alias::new(kind)).eq(ORDER_TYPE))
            .and_where(Expr::col(Alias::new(status)).is_in(COUNTED_STATUSES.iter().copied()))
            .and_where(
                Expr::col(Alias::new(created)).gt(cutoff.format("%Y-%m-%d %H:%M:%S").to_string()),
            )
            .limit(u64::from(QUERY_LIMIT))
            .to_owned()
    }
}

#[async_trait]
impl OrderSource for DatabaseOrderSource {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn is_available(&self) -> bool {
        let storage = self.storage().await;
        let table = self.table(storage);
        let probe = Query::select()
            .column(Alias::new(storage.columns()[0]))
            .from(Alias::new(table.as_str()))
            .limit(1)
            .to_owned();
        let backend = self.conn.get_database_backend();

        match self.conn.query_all(backend.build(&probe)).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Orders table {} not queryable: {}", table, e);
                false
            }
        }
    }

    async fn count_recent_orders(
        &self,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        let storage = self.storage().await;
        let stmt = self.recent_orders_query(storage, now - window.duration());
        let backend = self.conn.get_database_backend();
        let rows = self.conn.query_all(backend.build(&stmt)).await?;
        debug!(?storage, rows = rows.len(), "Counted recent orders");

        Ok(saturating_count(rows.len()))
    }
}

/// Counts through the WooCommerce REST API.
pub struct RestOrderSource {
    client: WooCommerceClient,
}

impl RestOrderSource {
    #[must_use]
    pub const fn new(client: WooCommerceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderSource for RestOrderSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn is_available(&self) -> bool {
        match self.client.ping().await {
            Ok(available) => available,
            Err(e) => {
                debug!("WooCommerce REST API unreachable: {}", e);
                false
            }
        }
    }

    async fn count_recent_orders(
        &self,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        let orders = self
            .client
            .list_orders_after(now - window.duration(), COUNTED_STATUSES, QUERY_LIMIT)
            .await?;

        Ok(saturating_count(orders.len()))
    }
}

/// No commerce integration installed.
pub struct NoOrderSource;

#[async_trait]
impl OrderSource for NoOrderSource {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn count_recent_orders(
        &self,
        _window: TimeWindow,
        _now: DateTime<Utc>,
    ) -> Result<u32, OrderSourceError> {
        Ok(0)
    }
}
