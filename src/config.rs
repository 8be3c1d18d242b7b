//! Run configuration.
//!
//! Built once at startup from defaults, an optional TOML file and CLI
//! overrides, then handed to every component by reference.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PulseError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_path: PathBuf,
    pub thresholds: Thresholds,
    pub display: DisplayConfig,
    pub updates: UpdatesConfig,
    pub probe: ProbeConfig,
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub disk_usage_percent: u8,
    pub memory_usage_percent: u8,
    pub load_average: f64,
    pub monitored_services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Program used to draw the distribution banner.
    pub tool: String,
    /// Try to install `tool` through the package manager when it is missing.
    pub install: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    /// Refresh the package index before counting pending updates.
    pub refresh_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub command_timeout_secs: u64,
    pub package_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub destination: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_path: PathBuf::from("/tmp/syspulse_health.log"),
            thresholds: Thresholds::default(),
            display: DisplayConfig::default(),
            updates: UpdatesConfig::default(),
            probe: ProbeConfig::default(),
            backup: BackupConfig::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            disk_usage_percent: 80,
            memory_usage_percent: 80,
            load_average: 2.0,
            monitored_services: vec!["sshd".to_string(), "cron".to_string()],
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            tool: "neofetch".to_string(),
            install: true,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            command_timeout_secs: 30,
            package_timeout_secs: 300,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            destination: "~/backups".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| PulseError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PulseError::io(path, e))?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&contents)
    }

    /// Explicit path if given, otherwise the per-user config file when it
    /// exists, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.disk_usage_percent > 100 {
            return Err(PulseError::Config(format!(
                "disk_usage_percent must be 0-100, got {}",
                t.disk_usage_percent
            )));
        }
        if t.memory_usage_percent > 100 {
            return Err(PulseError::Config(format!(
                "memory_usage_percent must be 0-100, got {}",
                t.memory_usage_percent
            )));
        }
        if !t.load_average.is_finite() || t.load_average < 0.0 {
            return Err(PulseError::Config(format!(
                "load_average must be a non-negative number, got {}",
                t.load_average
            )));
        }
        if self.probe.command_timeout_secs == 0 || self.probe.package_timeout_secs == 0 {
            return Err(PulseError::Config("timeouts must be at least 1 second".into()));
        }
        if self.display.tool.trim().is_empty() {
            return Err(PulseError::Config("display.tool must not be empty".into()));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("syspulse").join("config.toml"))
}
