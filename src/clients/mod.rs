pub mod monitor;
pub mod woocommerce;

pub use monitor::{ActivationError, ActivationPayload, MonitorClient};
pub use woocommerce::WooCommerceClient;
