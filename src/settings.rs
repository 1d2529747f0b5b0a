use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_FILE: &str = "coupon";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    /// Remove the database when it is closed.
    #[serde(default)]
    pub temporary: bool,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub filter: String,
}

impl Settings {
    /// Defaults, then `coupon.toml` (or any format `config` knows) from the working
    /// directory if present, then `COUPON_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(DEFAULT_SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Config::builder()
            .set_default("database.path", "coupon.db")?
            .set_default("database.temporary", false)?
            .set_default("log.filter", "info")?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("coupon")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .context("Failed to load/deserialize settings")
    }
}

impl DatabaseSettings {
    pub fn open(&self) -> sled::Result<sled::Db> {
        sled::Config::new()
            .path(&self.path)
            .temporary(self.temporary)
            .open()
    }
}
