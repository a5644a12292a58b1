//! Status command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_status(config: Config) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let overview = shared.overview_service.overview(chrono::Utc::now()).await?;
    let settings = &overview.settings;

    println!("Sales Health Monitor");
    println!("{:-<50}", "");
    println!(
        "  Enabled:   {}",
        if settings.enabled { "yes" } else { "no" }
    );
    println!(
        "  Email:     {}",
        if settings.email.is_empty() {
            "(none)"
        } else {
            &settings.email
        }
    );
    println!("  Threshold: {}", settings.threshold);
    println!("  Window:    {}", settings.window);
    println!();

    let last = overview.last_accessed_display.as_deref().unwrap_or("Never");
    let marker = if overview.last_accessed_fresh { "✓" } else { "✗" };
    println!("  Last accessed: {last} {marker}");

    if overview.integration_available {
        println!(
            "  Orders in recent {}: {} ({})",
            overview.window_label, overview.order_count, overview.health
        );
    } else {
        println!("  Orders: WooCommerce not available ({})", shared.orders.name());
    }

    Ok(())
}
