//! Server-rendered settings page.

use axum::{
    Form,
    extract::{Query, State},
    response::Html,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;
use std::sync::Arc;
use tracing::warn;

use super::auth::AuthQuery;
use super::{ApiError, AppState};
use crate::models::{Notice, SettingsForm, TimeWindow};
use crate::services::Overview;

const PAGE_TITLE: &str = "Sales Health Monitor for WooCommerce Settings";
const ACTIVATION_MESSAGE: &str =
    "Thank you for installing Sales Health Monitor! Please configure and enable the monitor.";
const THRESHOLD_HINT: &str = "Anything less in the allowed time frame will raise a notification";
const ACTIVE_HINT: &str = "By enabling the service you agree to securely share aggregated sale data with our monitoring service";

/// `GET /admin`
pub async fn settings_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
) -> Result<Html<String>, ApiError> {
    let mut notices = Vec::new();
    if state.store().take_activation_notice().await? {
        notices.push(Notice::info(ACTIVATION_MESSAGE));
    }

    render(&state, &query, &notices).await
}

/// `POST /admin`
pub async fn submit_settings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
    Form(form): Form<SettingsForm>,
) -> Result<Html<String>, ApiError> {
    let notice = match form.sanitize() {
        Ok(settings) => match state.shared.settings_service.save(settings).await {
            Ok(outcome) => outcome.notice(),
            Err(e) => {
                warn!("Settings form rejected: {}", e);
                Some(e.notice())
            }
        },
        Err(e) => Some(Notice::error(format!("Error! {e}"))),
    };

    let notices: Vec<Notice> = notice.into_iter().collect();
    render(&state, &query, &notices).await
}

async fn render(
    state: &AppState,
    query: &AuthQuery,
    notices: &[Notice],
) -> Result<Html<String>, ApiError> {
    let overview = state
        .shared
        .overview_service
        .overview(chrono::Utc::now())
        .await?;

    let action = form_action(query, state.config().server.allow_api_key_in_query);
    Ok(Html(render_page(&overview, notices, &action)))
}

/// Keeps `?api_key=` on the form target so a query-authenticated session
/// can submit.
fn form_action(query: &AuthQuery, allow_query: bool) -> String {
    match query.api_key.as_deref() {
        Some(key) if allow_query && !key.is_empty() => {
            let encoded: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("api_key", key)
                .finish();
            format!("/admin?{encoded}")
        }
        _ => "/admin".to_string(),
    }
}

fn render_page(overview: &Overview, notices: &[Notice], action: &str) -> String {
    let settings = &overview.settings;
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<div class=\"wrap\">\n<h1>{title}</h1>\n",
        title = encode_text(PAGE_TITLE)
    );

    for notice in notices {
        let _ = writeln!(
            html,
            "<div class=\"notice {}\"><p>{}</p></div>",
            notice.level.css_class(),
            encode_text(&notice.message)
        );
    }

    let _ = writeln!(
        html,
        "<form method=\"post\" action=\"{}\">\n<h2>Main Settings</h2>\n<table class=\"form-table\">",
        encode_double_quoted_attribute(action)
    );

    let _ = writeln!(
        html,
        "<tr><th><label for=\"field_email\">Notification Email</label></th><td><input style=\"width: 100%; max-width: 200px\" type=\"email\" name=\"field_email\" id=\"field_email\" value=\"{}\" /></td></tr>",
        encode_double_quoted_attribute(&settings.email)
    );

    let _ = writeln!(
        html,
        "<tr><th><label for=\"field_threshold\">Minimum Sales Allowed</label></th><td><input style=\"width: 100%; max-width: 200px\" min=\"0\" type=\"number\" name=\"field_threshold\" id=\"field_threshold\" value=\"{}\" />\n<p class=\"description\">{}</p></td></tr>",
        settings.threshold,
        encode_text(THRESHOLD_HINT)
    );

    html.push_str("<tr><th><label for=\"field_hours\">Time Frame</label></th><td><select style=\"width: 100%; max-width: 200px\" name=\"field_hours\" id=\"field_hours\">");
    for window in TimeWindow::ALL {
        let selected = if window == settings.window {
            " selected=\"selected\""
        } else {
            ""
        };
        let _ = write!(
            html,
            "<option value=\"{}\"{selected}>{}</option>",
            window.hours(),
            encode_text(window.option_label())
        );
    }
    html.push_str("</select></td></tr>\n");

    let _ = writeln!(
        html,
        "<tr><th><label for=\"field_active\">Monitor Enabled?</label></th><td><input type=\"checkbox\" name=\"field_active\" id=\"field_active\" value=\"1\"{} />\n<p class=\"description\">{}</p></td></tr>",
        if settings.enabled { " checked" } else { "" },
        encode_text(ACTIVE_HINT)
    );

    html.push_str("</table>\n<p class=\"submit\"><input type=\"submit\" class=\"button button-primary\" value=\"Save Changes\" /></p>\n</form>\n");

    let last_accessed = overview.last_accessed_display.as_deref().map_or_else(
        || "<span style='color: red'>Never</span>".to_string(),
        |display| {
            let color = if overview.last_accessed_fresh {
                "green"
            } else {
                "red"
            };
            format!("<span style='color: {color}'>{}</span>", encode_text(display))
        },
    );

    let _ = write!(
        html,
        "<h2>Extra Information</h2>\n<p><strong>Last Accessed:</strong> {last_accessed}</p>\n<p><strong>Number of Orders in recent {}:</strong> <span style='color: {}'>{}</span></p>\n</div>\n</body>\n</html>\n",
        encode_text(&overview.window_label),
        overview.health.color(),
        overview.order_count
    );

    html
}
