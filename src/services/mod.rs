pub mod order_source;
pub use order_source::{
    DatabaseOrderSource, NoOrderSource, OrderSource, OrderSourceError, RestOrderSource,
    build_order_source, count_or_zero,
};

pub mod settings_service;
pub use settings_service::{SaveOutcome, SettingsError, SettingsService};

pub mod status_service;
pub use status_service::{StatusError, StatusReport, StatusService};

pub mod overview_service;
pub use overview_service::{Overview, OverviewService};
