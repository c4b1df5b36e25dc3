use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, time::Duration};

/// Overrides the base directory for config and ledger data.
pub const HOME_ENV_VAR: &str = "FINANSYS_HOME";

/// User-configurable preferences for the ledger and its front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the snapshot file lives. Defaults to the resolved base dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Versioned storage slot. Changing it starts from an empty ledger.
    pub storage_key: String,
    pub reminder_lead_hours: u32,
    pub recent_limit: usize,
    pub log_filter: String,
    pub ui_color_enabled: bool,
    pub locale: String,
    pub currency_symbol: String,
    pub outbox: OutboxSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: "finansys-storage-v2".into(),
            reminder_lead_hours: 48,
            recent_limit: 10,
            log_filter: "finansys=info".into(),
            ui_color_enabled: true,
            locale: "pt-BR".into(),
            currency_symbol: "R$".into(),
            outbox: OutboxSettings::default(),
        }
    }
}

impl Config {
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => resolve_base_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxSettings {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl OutboxSettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for OutboxSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 200,
        }
    }
}

/// `$FINANSYS_HOME`, else the platform data dir, else the working directory.
pub fn resolve_base_dir() -> PathBuf {
    if let Some(home) = env::var_os(HOME_ENV_VAR).filter(|value| !value.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::data_dir()
        .map(|dir| dir.join("finansys"))
        .unwrap_or_else(|| PathBuf::from("."))
}
