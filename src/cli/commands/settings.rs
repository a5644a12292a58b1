//! Settings command handler

use crate::config::Config;
use crate::models::{Settings, TimeWindow, sanitize_email};
use crate::state::SharedState;

/// Fields to override; `None` keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct SettingsChange {
    pub email: Option<String>,
    pub threshold: Option<u32>,
    pub hours: Option<u32>,
    pub enabled: Option<bool>,
}

impl SettingsChange {
    fn apply(self, mut settings: Settings) -> anyhow::Result<Settings> {
        if let Some(email) = self.email {
            settings.email = sanitize_email(&email);
        }
        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(hours) = self.hours {
            settings.window = TimeWindow::try_from(hours)?;
        }
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        Ok(settings)
    }
}

pub async fn cmd_settings(config: Config, change: SettingsChange) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let service = &shared.settings_service;

    let updated = change.apply(service.current().await?)?;

    match service.save(updated).await {
        Ok(outcome) => match outcome.notice() {
            Some(notice) => println!("{}", notice.message),
            None => println!("Settings unchanged, monitor not contacted."),
        },
        Err(e) => {
            println!("{}", e.notice().message);
            anyhow::bail!("settings were not saved");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_unset_fields() {
        let current = Settings::defaults("owner@example.com");
        let change = SettingsChange {
            threshold: Some(7),
            enabled: Some(true),
            ..SettingsChange::default()
        };

        let updated = change.apply(current).unwrap();
        assert_eq!(updated.email, "owner@example.com");
        assert_eq!(updated.threshold, 7);
        assert_eq!(updated.window, TimeWindow::OneDay);
        assert!(updated.enabled);
    }

    #[test]
    fn test_apply_rejects_unknown_window() {
        let change = SettingsChange {
            hours: Some(36),
            ..SettingsChange::default()
        };
        assert!(change.apply(Settings::defaults("")).is_err());
    }
}
