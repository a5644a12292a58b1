pub mod notice;
pub mod settings;
pub mod site;

pub use notice::{Notice, NoticeLevel};
pub use settings::{
    Settings, SettingsForm, SettingsInputError, SettingsRequest, TimeWindow, absint, sanitize_email,
};
pub use site::SiteIdentity;
