pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod options {

    pub const SETTINGS: &str = "settings";

    pub const SECRET_TOKEN: &str = "secret_token";

    pub const ADMIN_KEY: &str = "admin_key";

    pub const LAST_ACCESSED: &str = "last_accessed";

    pub const ACTIVATION_NOTICE: &str = "activation_notice";
}

pub mod orders {

    /// Statuses that count as a sale.
    pub const COUNTED_STATUSES: &[&str] = &["wc-completed", "wc-processing"];

    /// Result window of a single order query. Counts saturate here.
    pub const QUERY_LIMIT: u32 = 100;

    pub const ORDER_TYPE: &str = "shop_order";

    /// `yes` when orders live in the HPOS `wc_orders` table.
    pub const HPOS_OPTION: &str = "woocommerce_custom_orders_table_enabled";
}

pub mod monitor {

    pub const ACTIVATE_PATH: &str = "api/activate";

    pub const USER_AGENT: &str = concat!("SalesHealthMonitor/", env!("CARGO_PKG_VERSION"));
}
