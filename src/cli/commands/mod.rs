mod init;
mod serve;
mod settings;
mod status;
mod token;

pub use init::cmd_init;
pub use serve::cmd_serve;
pub use settings::{SettingsChange, cmd_settings};
pub use status::cmd_status;
pub use token::cmd_token;
