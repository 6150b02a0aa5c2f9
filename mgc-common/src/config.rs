//! Configuration loading
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub const ENV_BIND_ADDRESS: &str = "MGC_BIND_ADDRESS";
pub const ENV_DATABASE_PATH: &str = "MGC_DATABASE_PATH";
pub const ENV_CLASSIFIER_ENDPOINT: &str = "MGC_CLASSIFIER_ENDPOINT";
pub const ENV_CLASSIFIER_TIMEOUT_MS: &str = "MGC_CLASSIFIER_TIMEOUT_MS";
pub const ENV_CLASSIFIER_FALLBACK: &str = "MGC_CLASSIFIER_FALLBACK";
pub const ENV_LOG_LEVEL: &str = "MGC_LOG_LEVEL";

/// What the prediction client does when the classifier can't be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Return the deterministic fallback prediction
    #[default]
    Substitute,
    /// Return the failure to the caller
    Surface,
}

impl FromStr for FallbackPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "substitute" => Ok(FallbackPolicy::Substitute),
            "surface" => Ok(FallbackPolicy::Surface),
            other => Err(Error::Config(format!(
                "Unknown fallback policy {:?} (expected \"substitute\" or \"surface\")",
                other
            ))),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPolicy::Substitute => f.write_str("substitute"),
            FallbackPolicy::Surface => f.write_str("surface"),
        }
    }
}

/// `[classifier]` table of the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierToml {
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
    pub fallback: Option<FallbackPolicy>,
}

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// On-disk TOML configuration; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub classifier: ClassifierToml,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from `path`; a missing file yields the empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        Self::parse(&content)
    }
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub bind_address: SocketAddr,
    pub database_path: PathBuf,
    pub classifier_endpoint: String,
    pub classifier_timeout_ms: u64,
    pub fallback_policy: FallbackPolicy,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let database_path = dirs::data_local_dir()
            .map(|d| d.join("mgc").join("mgc.db"))
            .unwrap_or_else(|| PathBuf::from("./mgc_data/mgc.db"));

        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5780)),
            database_path,
            classifier_endpoint: "http://localhost:8000/predict".to_string(),
            classifier_timeout_ms: 10_000,
            fallback_policy: FallbackPolicy::Substitute,
            log_level: "info".to_string(),
        }
    }
}

/// Default config file location (`<config dir>/mgc/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mgc").join("config.toml"))
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub database_path: Option<PathBuf>,
    pub classifier_endpoint: Option<String>,
    pub classifier_timeout_ms: Option<u64>,
    pub fallback_policy: Option<FallbackPolicy>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: SocketAddr,
    pub database_path: PathBuf,
    pub classifier_endpoint: String,
    pub classifier_timeout: Duration,
    pub fallback_policy: FallbackPolicy,
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve from CLI overrides, process environment, TOML file and defaults
    pub fn resolve(cli: &ConfigOverrides) -> Result<Self> {
        let toml_path = cli.config_path.clone().or_else(default_config_path);
        let toml_config = match &toml_path {
            Some(path) => {
                if cli.config_path.is_some() && !path.exists() {
                    warn!("Config file {} not found, using defaults", path.display());
                }
                TomlConfig::load(path)?
            }
            None => TomlConfig::default(),
        };
        Self::resolve_with(cli, &toml_config, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit TOML config and environment lookup
    pub fn resolve_with<F>(cli: &ConfigOverrides, toml_config: &TomlConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CompiledDefaults::for_current_platform();

        let bind_address = match cli
            .bind_address
            .clone()
            .or_else(|| env(ENV_BIND_ADDRESS))
            .or_else(|| toml_config.bind_address.clone())
        {
            Some(addr) => addr
                .parse::<SocketAddr>()
                .map_err(|e| Error::Config(format!("Invalid bind address {:?}: {}", addr, e)))?,
            None => defaults.bind_address,
        };

        let database_path = cli
            .database_path
            .clone()
            .or_else(|| env(ENV_DATABASE_PATH).map(PathBuf::from))
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or(defaults.database_path);

        let classifier_endpoint = cli
            .classifier_endpoint
            .clone()
            .or_else(|| env(ENV_CLASSIFIER_ENDPOINT))
            .or_else(|| toml_config.classifier.endpoint.clone())
            .unwrap_or(defaults.classifier_endpoint);

        let env_timeout = env(ENV_CLASSIFIER_TIMEOUT_MS)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    Error::Config(format!("Invalid {} {:?}: {}", ENV_CLASSIFIER_TIMEOUT_MS, raw, e))
                })
            })
            .transpose()?;
        let timeout_ms = cli
            .classifier_timeout_ms
            .or(env_timeout)
            .or(toml_config.classifier.timeout_ms)
            .unwrap_or(defaults.classifier_timeout_ms);
        if timeout_ms == 0 {
            return Err(Error::Config("Classifier timeout must be greater than 0 ms".to_string()));
        }

        let env_fallback = env(ENV_CLASSIFIER_FALLBACK)
            .map(|raw| raw.parse::<FallbackPolicy>())
            .transpose()?;
        let fallback_policy = cli
            .fallback_policy
            .or(env_fallback)
            .or(toml_config.classifier.fallback)
            .unwrap_or(defaults.fallback_policy);

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| env(ENV_LOG_LEVEL))
            .or_else(|| toml_config.logging.level.clone())
            .unwrap_or(defaults.log_level);

        Ok(Self {
            bind_address,
            database_path,
            classifier_endpoint,
            classifier_timeout: Duration::from_millis(timeout_ms),
            fallback_policy,
            log_level,
        })
    }
}
