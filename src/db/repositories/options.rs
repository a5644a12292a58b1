use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::{options, prelude::*};

pub struct OptionsRepository {
    conn: DatabaseConnection,
}

impl OptionsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, name: &str) -> Result<Option<String>> {
        let row = Options::find_by_id(name.to_string())
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to read option '{name}'"))?;

        Ok(row.map(|m| m.value))
    }

    /// Insert or overwrite.
    pub async fn set(&self, name: &str, value: &str) -> Result<()> {
        let active_model = options::ActiveModel {
            name: Set(name.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Options::insert(active_model)
            .on_conflict(
                OnConflict::column(options::Column::Name)
                    .update_columns([options::Column::Value, options::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .with_context(|| format!("Failed to write option '{name}'"))?;

        Ok(())
    }

    /// Returns `true` when this call created the row.
    pub async fn insert_if_absent(&self, name: &str, value: &str) -> Result<bool> {
        let active_model = options::ActiveModel {
            name: Set(name.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let inserted = Options::insert(active_model)
            .on_conflict(
                OnConflict::column(options::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .with_context(|| format!("Failed to insert option '{name}'"))?;

        Ok(inserted > 0)
    }

    /// Returns `true` when a row was removed.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let result = Options::delete_by_id(name.to_string())
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to delete option '{name}'"))?;

        Ok(result.rows_affected > 0)
    }
}
