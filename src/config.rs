//! TOML configuration parsing and validation.
//!
//! The configuration is read once at startup (default path
//! `./config/notes.toml`) and passed explicitly to the store, fetcher, and
//! server. There is no runtime reconfiguration.
//!
//! ```toml
//! [db]
//! path = "./data/numbers.sqlite"
//! busy_timeout_secs = 5
//!
//! [source]
//! url = "http://800notes.com/"
//! timeout_secs = 30
//!
//! [resolver]
//! default_limit = 60
//!
//! [store]
//! reset_on_start = false
//!
//! [server]
//! bind = "127.0.0.1:5000"
//! ```

use anyhow::{bail, Context, Result};
use notes_reporter_core::resolver::{ResolverSettings, DEFAULT_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

impl DbConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Page fetched on every query.
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Stored rows returned when no count is requested.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Cold-start mode: drop all stored entries when the process starts.
    #[serde(default)]
    pub reset_on_start: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let url = self.source.url.trim();
        if url.is_empty() {
            bail!("source.url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("source.url must be an http or https URL, got '{}'", url);
        }
        if self.source.timeout_secs == 0 {
            bail!("source.timeout_secs must be > 0");
        }
        if self.resolver.default_limit < 1 {
            bail!("resolver.default_limit must be >= 1");
        }
        Ok(())
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            source_url: self.source.url.trim().to_string(),
            default_limit: self.resolver.default_limit,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
