use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Updated,
    Error,
    Info,
}

impl NoticeLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Updated => "notice-success",
            Self::Error => "notice-error",
            Self::Info => "notice-info",
        }
    }
}

/// Message surfaced to the administrator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn updated(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Updated,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}
