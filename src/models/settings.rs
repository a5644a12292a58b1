use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsInputError {
    #[error("Invalid time frame: {0}")]
    InvalidWindow(String),
}

/// Look-back window for the order count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TimeWindow {
    SixHours,
    TwelveHours,
    #[default]
    OneDay,
    TwoDays,
    OneWeek,
}

impl TimeWindow {
    pub const ALL: [Self; 5] = [
        Self::SixHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::TwoDays,
        Self::OneWeek,
    ];

    #[must_use]
    pub const fn hours(self) -> u32 {
        match self {
            Self::SixHours => 6,
            Self::TwelveHours => 12,
            Self::OneDay => 24,
            Self::TwoDays => 48,
            Self::OneWeek => 168,
        }
    }

    #[must_use]
    pub const fn from_hours(hours: u32) -> Option<Self> {
        match hours {
            6 => Some(Self::SixHours),
            12 => Some(Self::TwelveHours),
            24 => Some(Self::OneDay),
            48 => Some(Self::TwoDays),
            168 => Some(Self::OneWeek),
            _ => None,
        }
    }

    #[must_use]
    pub fn duration(self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.hours()))
    }

    /// Label used in the time frame picker.
    #[must_use]
    pub const fn option_label(self) -> &'static str {
        match self {
            Self::SixHours => "6 hours",
            Self::TwelveHours => "12 hours",
            Self::OneDay => "24 hours",
            Self::TwoDays => "48 hours",
            Self::OneWeek => "7 days",
        }
    }

    /// "24 Hours" up to two days, whole days beyond that.
    #[must_use]
    pub fn summary_label(self) -> String {
        let hours = self.hours();
        if hours <= 48 {
            format!("{hours} Hours")
        } else {
            format!("{} Days", hours / 24)
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_label())
    }
}

impl TryFrom<u32> for TimeWindow {
    type Error = SettingsInputError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        Self::from_hours(hours).ok_or_else(|| SettingsInputError::InvalidWindow(hours.to_string()))
    }
}

impl From<TimeWindow> for u32 {
    fn from(window: TimeWindow) -> Self {
        window.hours()
    }
}

/// Monitor settings as stored and as sent to the activation endpoint.
///
/// Field names on the wire match the form field names, `field_active`
/// travels as `0`/`1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "field_email")]
    pub email: String,

    #[serde(rename = "field_threshold")]
    pub threshold: u32,

    #[serde(rename = "field_hours")]
    pub window: TimeWindow,

    #[serde(
        rename = "field_active",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub enabled: bool,
}

impl Settings {
    /// Values shown before the settings were ever saved.
    #[must_use]
    pub fn defaults(admin_email: &str) -> Self {
        Self {
            email: sanitize_email(admin_email),
            threshold: 1,
            window: TimeWindow::default(),
            enabled: false,
        }
    }
}

fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Text(s) => !s.is_empty() && s != "0",
    })
}

/// Raw settings form submission. Every field arrives as text; a missing
/// `field_active` means the checkbox was left unticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub field_email: String,

    #[serde(default)]
    pub field_threshold: String,

    #[serde(default)]
    pub field_hours: String,

    #[serde(default)]
    pub field_active: Option<String>,
}

impl SettingsForm {
    pub fn sanitize(&self) -> Result<Settings, SettingsInputError> {
        let hours = absint(&self.field_hours);
        let window = TimeWindow::from_hours(hours)
            .ok_or_else(|| SettingsInputError::InvalidWindow(self.field_hours.trim().to_string()))?;

        Ok(Settings {
            email: sanitize_email(&self.field_email),
            threshold: absint(&self.field_threshold),
            window,
            enabled: self.field_active.is_some(),
        })
    }
}

/// JSON body accepted by the settings API.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsRequest {
    pub email: String,
    pub threshold: u32,
    pub hours: u32,
    pub enabled: bool,
}

impl SettingsRequest {
    pub fn into_settings(self) -> Result<Settings, SettingsInputError> {
        Ok(Settings {
            email: sanitize_email(&self.email),
            threshold: self.threshold,
            window: TimeWindow::try_from(self.hours)?,
            enabled: self.enabled,
        })
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
            .expect("Invalid email regex")
    })
}

/// Trimmed address, or an empty string when it does not look like one.
#[must_use]
pub fn sanitize_email(input: &str) -> String {
    let trimmed = input.trim();
    if email_regex().is_match(trimmed) {
        trimmed.to_string()
    } else {
        String::new()
    }
}

/// Absolute value of the leading integer in `input`. Garbage yields 0,
/// overflow saturates.
#[must_use]
pub fn absint(input: &str) -> u32 {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix(['-', '+'])
        .unwrap_or(trimmed)
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>();

    if digits.is_empty() {
        return 0;
    }

    digits.parse::<u32>().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_labels() {
        assert_eq!(TimeWindow::SixHours.summary_label(), "6 Hours");
        assert_eq!(TimeWindow::TwoDays.summary_label(), "48 Hours");
        assert_eq!(TimeWindow::OneWeek.summary_label(), "7 Days");
        assert_eq!(TimeWindow::OneWeek.option_label(), "7 days");
    }

    #[test]
    fn test_window_rejects_unknown_hours() {
        assert_eq!(TimeWindow::from_hours(24), Some(TimeWindow::OneDay));
        assert!(TimeWindow::from_hours(0).is_none());
        assert!(TimeWindow::from_hours(72).is_none());
    }

    #[test]
    fn test_absint() {
        assert_eq!(absint("5"), 5);
        assert_eq!(absint(" -7 "), 7);
        assert_eq!(absint("12abc"), 12);
        assert_eq!(absint("abc"), 0);
        assert_eq!(absint(""), 0);
        assert_eq!(absint("99999999999999"), u32::MAX);
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email("  owner@example.com "), "owner@example.com");
        assert_eq!(sanitize_email("not-an-email"), "");
        assert_eq!(sanitize_email("a@b"), "");
    }

    #[test]
    fn test_form_sanitize() {
        let form = SettingsForm {
            field_email: "shop@example.com".to_string(),
            field_threshold: "-3".to_string(),
            field_hours: "168".to_string(),
            field_active: Some("1".to_string()),
        };

        let settings = form.sanitize().unwrap();
        assert_eq!(settings.threshold, 3);
        assert_eq!(settings.window, TimeWindow::OneWeek);
        assert!(settings.enabled);

        let unchecked = SettingsForm {
            field_active: None,
            ..form
        };
        assert!(!unchecked.sanitize().unwrap().enabled);
    }

    #[test]
    fn test_form_rejects_unknown_window() {
        let form = SettingsForm {
            field_hours: "72".to_string(),
            ..SettingsForm::default()
        };
        assert_eq!(
            form.sanitize(),
            Err(SettingsInputError::InvalidWindow("72".to_string()))
        );
    }

    #[test]
    fn test_settings_wire_shape() {
        let settings = Settings {
            email: "shop@example.com".to_string(),
            threshold: 5,
            window: TimeWindow::OneDay,
            enabled: true,
        };

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "field_email": "shop@example.com",
                "field_threshold": 5,
                "field_hours": 24,
                "field_active": 1
            })
        );

        let back: Settings = serde_json::from_value(value).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_settings_reject_stored_unknown_window() {
        let value = serde_json::json!({
            "field_email": "",
            "field_threshold": 1,
            "field_hours": 0,
            "field_active": 0
        });
        assert!(serde_json::from_value::<Settings>(value).is_err());
    }
}
