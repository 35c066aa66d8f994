//! SNMP health poller with per-device CSV logs.
//!
//! This crate provides the pieces of the polling pipeline:
//!
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`transport`] - SNMP request/response transport
//! - [`collector`] - Per-cycle sample collection
//! - [`sink`] - Append-only CSV sample store
//! - [`poller`] - Per-device polling loop
//! - [`registry`] - Device set and poller lifecycle
//! - [`error`] - Error types

pub mod collector;
pub mod config;
pub mod error;
pub mod oid;
pub mod poller;
pub mod registry;
pub mod sample;
pub mod sink;
pub mod transport;

// Re-export commonly used types at the crate root
pub use collector::Collector;
pub use config::{DeviceConfig, LogFormat, LoggingConfig, PollerConfig, SnmpConfig};
pub use error::{Error, Result};
pub use poller::DevicePoller;
pub use registry::{Registry, RegistryHandle};
pub use sample::{CSV_HEADER, Sample, TIMESTAMP_FORMAT};
pub use sink::CsvSink;
pub use transport::{QueryResponse, QueryTransport, SnmpTransport};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
