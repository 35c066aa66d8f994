use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;

use snmplog::config::{DEFAULT_REQUEST_TIMEOUT_SECS, DeviceConfig, LoggingConfig, PollerConfig};
use snmplog::init_tracing;
use snmplog::registry::Registry;
use snmplog::transport::SnmpTransport;

/// SNMP health poller with per-device CSV logs.
#[derive(Parser, Debug)]
#[command(name = "snmplog")]
#[command(about = "Poll SNMP devices and append health metrics to CSV logs", long_about = None)]
struct Args {
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll a single device forever.
    Poll {
        /// Device host (IP address or hostname).
        #[arg(long)]
        host: String,

        /// SNMP agent port.
        #[arg(long, default_value_t = 161)]
        port: u16,

        /// SNMP community string.
        #[arg(long, default_value = "public")]
        community: String,

        /// CSV file samples are appended to.
        #[arg(short, long)]
        output: PathBuf,

        /// Polling interval in seconds.
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Poll every device in a configuration file until stopped.
    Serve {
        /// Path to the configuration file (JSON5 format).
        #[arg(short, long, default_value = "snmplog.json5")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut logging, request_timeout, devices) = match args.command {
        Command::Poll {
            host,
            port,
            community,
            output,
            interval,
        } => {
            let device = DeviceConfig {
                name: host.clone(),
                host,
                port,
                community,
                output,
                poll_interval_secs: interval,
            };
            (
                LoggingConfig::default(),
                Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
                vec![device],
            )
        }
        Command::Serve { config } => {
            let config = PollerConfig::load(&config)
                .with_context(|| format!("Failed to load config from {}", config.display()))?;
            config.validate().context("Invalid configuration")?;
            (
                config.logging,
                Duration::from_secs(config.snmp.request_timeout_secs),
                config.snmp.devices,
            )
        }
    };

    if let Some(level) = args.log_level {
        logging.level = level;
    }
    init_tracing(&logging).context("Failed to initialize tracing")?;

    tracing::info!(devices = devices.len(), "Starting snmplog");

    let mut registry = Registry::new(SnmpTransport::new(request_timeout));
    for device in devices {
        registry.add(device);
    }

    let handle = registry.handle();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
        tracing::info!("Shutting down...");
        handle.stop();
    });

    registry.start().await?;

    tracing::info!("Goodbye!");

    Ok(())
}
