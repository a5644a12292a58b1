//! Init command handler

use std::path::Path;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_init(config: &Config, config_path: Option<&Path>) -> anyhow::Result<()> {
    let created = match config_path {
        Some(path) if path.exists() => false,
        Some(path) => {
            config.save_to_path(path)?;
            true
        }
        None => Config::create_default_if_missing()?,
    };

    if created {
        println!("Created default config file.");
    } else {
        println!("Config file already exists, left untouched.");
    }

    let store = Store::new(&config.general.database_path).await?;
    store.ensure_secret_token().await?;
    store.ensure_admin_key().await?;
    // Every activation greets the admin again.
    store.arm_activation_notice().await?;

    println!("Database ready at {}", config.general.database_path);
    println!();
    println!("Show credentials with: sales-health-monitor token");

    Ok(())
}
