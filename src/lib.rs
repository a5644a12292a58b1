pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SettingsChange};
pub use config::Config;

/// Loads the config named on the command line, or the first one found in
/// the usual locations. A missing `--config` file is only allowed for `init`,
/// which writes it.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) if path.exists() => Config::load_from_path(path),
        Some(_) if matches!(cli.command, Some(Commands::Init)) => Ok(Config::default()),
        Some(path) => anyhow::bail!("Config file not found: {}", path.display()),
        None => Config::load(),
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    config.validate()?;

    init_tracing(&config)?;
    let prometheus_handle = init_metrics(&config)?;

    match cli.command {
        None | Some(Commands::Serve) => cli::cmd_serve(config, prometheus_handle).await,
        Some(Commands::Init) => cli::cmd_init(&config, cli.config.as_deref()).await,
        Some(Commands::Status) => cli::cmd_status(config).await,
        Some(Commands::Token) => cli::cmd_token(&config).await,
        Some(Commands::Settings {
            email,
            threshold,
            hours,
            enabled,
            disabled,
        }) => {
            let enabled = if enabled {
                Some(true)
            } else if disabled {
                Some(false)
            } else {
                None
            };

            cli::cmd_settings(
                config,
                SettingsChange {
                    email,
                    threshold,
                    hours,
                    enabled,
                },
            )
            .await
        }
    }
}

fn init_metrics(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "sales-health-monitor")?
            .extra_field("site", config.site.url.clone())?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}
