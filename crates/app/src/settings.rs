//! Settings of the application.
//!
//! Read from `config/settings.toml` when present, then overridden by
//! `LEDGERBOT__<SECTION>__<KEY>` environment variables, e.g.
//! `LEDGERBOT__TELEGRAM__TOKEN`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// `tracing` level of the ledger crates.
    pub level: String,
    /// IANA zone used for calendar days.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file, created when missing.
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("ledger.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub admin_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Digest {
    pub enabled: bool,
    /// Local wall-clock time, `HH:MM`.
    pub at: String,
}

impl Default for Digest {
    fn default() -> Self {
        Self {
            enabled: true,
            at: "21:00".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub telegram: Option<Telegram>,
    pub digest: Digest,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false))
            .add_source(Environment::with_prefix("LEDGERBOT").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
