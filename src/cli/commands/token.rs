use crate::config::Config;
use crate::db::Store;

pub async fn cmd_token(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let secret = store.ensure_secret_token().await?;
    let admin_key = store.ensure_admin_key().await?;

    println!("Secret token: {secret}");
    println!("Admin key:    {admin_key}");

    Ok(())
}
