use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::collector::Collector;
use crate::config::DeviceConfig;
use crate::poller::DevicePoller;
use crate::sink::CsvSink;
use crate::transport::QueryTransport;

/// Owns the configured device set and runs one poller task per device.
pub struct Registry<T> {
    devices: Vec<DeviceConfig>,
    transport: T,
    cancel: CancellationToken,
}

/// Stop handle for a running registry.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    cancel: CancellationToken,
}

impl RegistryHandle {
    /// Request a cooperative stop; in-flight cycles complete first.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl<T: QueryTransport + Clone + 'static> Registry<T> {
    pub fn new(transport: T) -> Self {
        Self {
            devices: Vec::new(),
            transport,
            cancel: CancellationToken::new(),
        }
    }

    /// Register a device to monitor. Must be called before [`Registry::start`].
    pub fn add(&mut self, device: DeviceConfig) {
        self.devices.push(device);
    }

    /// Handle through which a running registry can be stopped.
    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Open every sink, launch one poller per device, and block until all
    /// pollers have exited after a [`RegistryHandle::stop`].
    ///
    /// Consuming `self` makes post-start registration impossible. A poller
    /// that dies on a sink error is logged; the others keep running.
    pub async fn start(self) -> Result<()> {
        // Every header must exist before the first row can be written.
        let mut pollers = Vec::with_capacity(self.devices.len());
        for device in self.devices {
            let sink = CsvSink::create(&device.output).await.with_context(|| {
                format!("Failed to create sink for device '{}'", device.name)
            })?;
            let collector = Collector::new(self.transport.clone())?;
            pollers.push(DevicePoller::new(device, collector, sink));
        }

        let mut tasks = JoinSet::new();
        for poller in pollers {
            let cancel = self.cancel.clone();
            tasks.spawn(async move { poller.run(cancel).await });
        }

        tracing::info!(devices = tasks.len(), "Registry running");

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Poller exited with error"),
                Err(e) => tracing::error!(error = %e, "Poller task panicked"),
            }
        }

        tracing::info!("Registry stopped");
        Ok(())
    }
}
