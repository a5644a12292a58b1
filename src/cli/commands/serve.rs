//! Serve command handler

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};

use crate::api;
use crate::config::Config;

pub async fn cmd_serve(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Sales Health Monitor v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        info!("HTTP server disabled in config, nothing to do");
        return Ok(());
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    info!(
        "Status endpoint at {}/{}",
        state.config().site.url.trim_end_matches('/'),
        state.config().site.endpoint_slug
    );

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://{}", addr);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}
