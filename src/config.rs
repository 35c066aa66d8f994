use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default SNMP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Root configuration for the poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// SNMP-specific settings.
    pub snmp: SnmpConfig,
}

/// SNMP-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Devices to poll.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Configuration for a single SNMP device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name (used in logs).
    pub name: String,

    /// Device host (IP address or hostname).
    pub host: String,

    /// SNMP agent port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SNMP community string.
    #[serde(default = "default_community")]
    pub community: String,

    /// CSV file samples are appended to.
    pub output: PathBuf,

    /// Polling interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_port() -> u16 {
    161
}

fn default_community() -> String {
    "public".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

impl DeviceConfig {
    /// Socket address string of the SNMP agent.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PollerConfig {
    /// Load configuration from a JSON5 file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        json5::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self> {
        json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate device entries.
    ///
    /// Every device needs a name, a host, and an output file of its own; a
    /// shared output file would interleave two pollers' rows.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut outputs = HashSet::new();

        for device in &self.snmp.devices {
            if device.name.is_empty() {
                return Err(Error::Config("Device name cannot be empty".to_string()));
            }
            if device.host.is_empty() {
                return Err(Error::Config(format!(
                    "Device '{}' has no host",
                    device.name
                )));
            }
            if device.poll_interval_secs == 0 {
                return Err(Error::Config(format!(
                    "Device '{}' has a zero polling interval",
                    device.name
                )));
            }
            if !names.insert(device.name.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate device name '{}'",
                    device.name
                )));
            }
            if !outputs.insert(device.output.as_path()) {
                return Err(Error::Config(format!(
                    "Device '{}' reuses output file '{}'",
                    device.name,
                    device.output.display()
                )));
            }
        }

        Ok(())
    }
}
