use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_CACHE_PATH: &str = "proxies.csv";
pub const DEFAULT_PROBE_TARGET: &str = "http://example.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache_path: PathBuf,
    pub freshness_secs: u64,
    pub fetch: FetchConfig,
    pub probe: ProbeConfig,
    pub logging: LoggingConfig,
    pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub target: String,
    pub timeout_secs: u64,
    /// Probes in flight per source.
    pub concurrency: usize,
    /// Permit candidates resolving to loopback/private ranges.
    pub allow_private: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console: bool,
    pub file: bool,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Providers {
    pub proxyscrape: ProviderConfig,
    pub scrapingant: ProviderConfig,
    pub speedx: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            freshness_secs: 60 * 60,
            fetch: FetchConfig::default(),
            probe: ProbeConfig::default(),
            logging: LoggingConfig::default(),
            providers: Providers::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_PROBE_TARGET.to_string(),
            timeout_secs: 5,
            concurrency: 64,
            allow_private: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console: true,
            file: true,
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
        }
    }
}

impl Settings {
    /// Loads `config.toml` from the working directory.
    pub fn new() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// A missing file yields the defaults; a present but invalid one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} not found, using default settings", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::config(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Self::from_toml(&config_data).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_toml(config_data: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(config_data).map_err(|e| Error::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.freshness_secs == 0 {
            return Err(Error::config("freshness_secs must be greater than zero"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::config("fetch.timeout_secs must be greater than zero"));
        }
        if self.probe.timeout_secs == 0 {
            return Err(Error::config("probe.timeout_secs must be greater than zero"));
        }
        if self.probe.concurrency == 0 {
            return Err(Error::config("probe.concurrency must be greater than zero"));
        }

        let target = url::Url::parse(&self.probe.target)
            .map_err(|e| Error::config(format!("probe.target {:?}: {}", self.probe.target, e)))?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "probe.target must be an http(s) URL, got {:?}",
                self.probe.target
            )));
        }
        Ok(())
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout_secs)
    }
}
