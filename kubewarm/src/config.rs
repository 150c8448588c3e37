//! Configuration management for kubewarm
//!
//! This module provides a centralized configuration system that loads settings from:
//! 1. Command-line flags (highest priority, applied by `main`)
//! 2. Environment variables
//! 3. Configuration file (TOML format)
//! 4. Default values (lowest priority)

use crate::kubernetes::ProbeKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "KUBEWARM_CONFIG";

/// Main configuration struct for kubewarm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubewarmConfig {
    /// Kubeconfig location
    pub kubeconfig: KubeconfigConfig,
    /// Probe configuration
    pub probe: ProbeConfig,
    /// Shutdown configuration
    pub shutdown: ShutdownConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Kubeconfig location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeconfigConfig {
    /// Explicit kubeconfig file; overrides `KUBECONFIG` and `~/.kube/config`
    pub path: Option<PathBuf>,
}

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Seconds between probes of each cluster
    pub interval_secs: u64,
    /// Read-only call issued per probe
    pub kind: ProbeKind,
}

/// Shutdown configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Seconds allowed between cancellation and forced exit
    pub grace_period_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins if set
    pub level: String,
    /// Emit JSON lines on the console
    pub json: bool,
    /// Directory for rolling JSON log files; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Log file rotation policy
    pub rotation: LogRotation,
}

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(LogRotation::Hourly),
            "daily" => Ok(LogRotation::Daily),
            "never" => Ok(LogRotation::Never),
            other => Err(format!("unknown rotation '{}'", other)),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            kind: ProbeKind::default(),
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
            rotation: LogRotation::Daily,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl KubewarmConfig {
    /// Load configuration from the config file and environment variables
    ///
    /// `explicit` (from `--config`) or `KUBEWARM_CONFIG` must name a readable
    /// file. Otherwise the standard locations are tried and defaults are
    /// used when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit.or_else(Self::find_config_file) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        [
            PathBuf::from("/etc/kubewarm/config.toml"),
            PathBuf::from("./kubewarm.toml"),
        ]
        .into_iter()
        .find(|p| p.exists())
    }

    /// Apply environment variable overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Probe
        if let Some(interval) = lookup("KUBEWARM_PROBE_INTERVAL_SECS") {
            if let Ok(interval) = interval.parse() {
                self.probe.interval_secs = interval;
            }
        }
        if let Some(kind) = lookup("KUBEWARM_PROBE_KIND") {
            if let Ok(kind) = kind.parse() {
                self.probe.kind = kind;
            }
        }

        // Shutdown
        if let Some(grace) = lookup("KUBEWARM_GRACE_PERIOD_SECS") {
            if let Ok(grace) = grace.parse() {
                self.shutdown.grace_period_secs = grace;
            }
        }

        // Logging
        if let Some(level) = lookup("KUBEWARM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("KUBEWARM_LOG_JSON") {
            self.logging.json = json.parse().unwrap_or(self.logging.json);
        }
        if let Some(dir) = lookup("KUBEWARM_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Probe interval cannot be 0".to_string(),
            ));
        }

        if self.shutdown.grace_period_secs == 0 {
            return Err(ConfigError::Validation(
                "Grace period cannot be 0".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("Log level cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Failed to read configuration file
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    Parse(String),
    /// Configuration validation failed
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, err) => {
                write!(f, "Failed to read config file {:?}: {}", path, err)
            }
            ConfigError::Parse(err) => write!(f, "Failed to parse config: {}", err),
            ConfigError::Validation(err) => write!(f, "Config validation failed: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}
