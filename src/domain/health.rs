use serde::Serialize;
use std::fmt;

/// Outcome of comparing the recent order count against the configured
/// minimum.
///
/// # Examples
///
/// ```rust
/// use sales_health_monitor::domain::Health;
///
/// assert_eq!(Health::evaluate(3, 5), Health::Unhealthy);
/// assert_eq!(Health::evaluate(5, 5), Health::Healthy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
}

impl Health {
    /// Unhealthy iff `count < threshold`. A threshold of zero is always
    /// healthy.
    #[must_use]
    pub const fn evaluate(count: u32, threshold: u32) -> Self {
        if count < threshold {
            Self::Unhealthy
        } else {
            Self::Healthy
        }
    }

    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Display color used by the admin page.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Healthy => "green",
            Self::Unhealthy => "red",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Unhealthy => f.write_str("unhealthy"),
        }
    }
}
