use std::net::IpAddr;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::util;

const DEFAULT_INTERVAL_SECS: NonZeroU64 = NonZeroU64::new(10).unwrap();
const DEFAULT_MAX_SAMPLES: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
const DEFAULT_MAX_ENTRIES: NonZeroUsize = NonZeroUsize::new(200).unwrap();

/// Agent configuration
///
/// Every section and key is optional; missing ones take their defaults, so a
/// file only has to name what it changes. Zero intervals and capacities are
/// rejected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub host: IpAddr,
    pub port: u16,
    pub debug: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: util::get_default_addr(),
            port: util::get_default_port(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    #[serde(alias = "collection_interval")]
    pub collection_interval_seconds: NonZeroU64,
    pub max_samples: NonZeroUsize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            collection_interval_seconds: DEFAULT_INTERVAL_SECS,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directories: Vec<PathBuf>,
    pub max_entries: NonZeroUsize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directories: vec![PathBuf::from("logs")],
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    pub fn metrics_interval(&self) -> Duration {
        Duration::from_secs(self.metrics.collection_interval_seconds.get())
    }

    /// Apply `COLLECTOR_ADDR` / `COLLECTOR_PORT` from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(addr) = util::get_addr() {
            self.api.host = addr;
        }
        if let Some(port) = util::get_port() {
            self.api.port = port;
        }
        self
    }
}

pub fn read_config_file(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&file_content)
        .with_context(|| format!("invalid configuration file {}", path.display()))
        .inspect(|config| trace!("loaded config: {config:?}"))
}

/// Like [`read_config_file`], but never fails: a missing or broken file
/// yields the defaults and a warning.
pub fn load_config(path: impl AsRef<Path>) -> Config {
    let path = path.as_ref();
    if !path.exists() {
        warn!(
            "config file {} not found, using default configuration",
            path.display()
        );
        return Config::default();
    }

    read_config_file(path).unwrap_or_else(|e| {
        warn!("using default configuration due to config error: {e:#}");
        Config::default()
    })
}
