use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::options;
use crate::models::Settings;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn options_repo(&self) -> repositories::options::OptionsRepository {
        repositories::options::OptionsRepository::new(self.conn.clone())
    }

    /// Stored settings, or `None` when they were never saved. A corrupt
    /// blob is treated as absent.
    pub async fn get_settings(&self) -> Result<Option<Settings>> {
        let Some(raw) = self.options_repo().get(options::SETTINGS).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                warn!("Ignoring unreadable stored settings: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn put_settings(&self, settings: &Settings) -> Result<()> {
        let raw = serde_json::to_string(settings)?;
        self.options_repo().set(options::SETTINGS, &raw).await
    }

    pub async fn get_secret_token(&self) -> Result<Option<String>> {
        let token = self.options_repo().get(options::SECRET_TOKEN).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    /// Returns the shared secret, generating it on first activation. A fresh
    /// token also arms the one-shot welcome notice.
    pub async fn ensure_secret_token(&self) -> Result<String> {
        if let Some(token) = self.get_secret_token().await? {
            return Ok(token);
        }

        let repo = self.options_repo();
        // An empty row would block insert_if_absent forever.
        repo.delete(options::SECRET_TOKEN).await?;

        if repo
            .insert_if_absent(options::SECRET_TOKEN, &generate_token())
            .await?
        {
            info!("Generated new secret token");
            self.arm_activation_notice().await?;
        }

        self.get_secret_token()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Secret token missing after generation"))
    }

    pub async fn get_admin_key(&self) -> Result<Option<String>> {
        let key = self.options_repo().get(options::ADMIN_KEY).await?;
        Ok(key.filter(|k| !k.is_empty()))
    }

    pub async fn ensure_admin_key(&self) -> Result<String> {
        if let Some(key) = self.get_admin_key().await? {
            return Ok(key);
        }

        let repo = self.options_repo();
        repo.delete(options::ADMIN_KEY).await?;
        if repo
            .insert_if_absent(options::ADMIN_KEY, &generate_token())
            .await?
        {
            info!("Generated new admin key");
        }

        self.get_admin_key()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Admin key missing after generation"))
    }

    pub async fn get_last_accessed(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = self.options_repo().get(options::LAST_ACCESSED).await?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }

    pub async fn set_last_accessed(&self, at: DateTime<Utc>) -> Result<()> {
        self.options_repo()
            .set(options::LAST_ACCESSED, &at.to_rfc3339())
            .await
    }

    /// Shows the welcome notice on the next admin page load.
    pub async fn arm_activation_notice(&self) -> Result<()> {
        self.options_repo().set(options::ACTIVATION_NOTICE, "1").await
    }

    /// Reads and clears the welcome notice flag.
    pub async fn take_activation_notice(&self) -> Result<bool> {
        self.options_repo().delete(options::ACTIVATION_NOTICE).await
    }
}

/// RFC 3339, or the `YYYY-MM-DD HH:MM:SS` UTC form older installs wrote.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Random 64 character hex string.
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
