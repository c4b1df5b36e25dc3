//! finansys-config
//!
//! User preferences for the ledger front end and the paths it writes to.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{resolve_base_dir, Config, OutboxSettings, HOME_ENV_VAR};
