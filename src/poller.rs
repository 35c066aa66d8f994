use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::collector::Collector;
use crate::config::DeviceConfig;
use crate::sink::CsvSink;
use crate::transport::QueryTransport;

/// Periodic polling loop for a single device.
///
/// Each cycle collects one sample and hands it to the sink; a skipped cycle
/// (collector returned nothing) is not an error. The period is measured from
/// cycle start, so a slow cycle shifts the phase of later cycles instead of
/// shortening the next sleep.
pub struct DevicePoller<T> {
    device: DeviceConfig,
    collector: Collector<T>,
    sink: CsvSink,
    period: Duration,
}

impl<T: QueryTransport> DevicePoller<T> {
    /// Create a poller using the device's configured interval.
    pub fn new(device: DeviceConfig, collector: Collector<T>, sink: CsvSink) -> Self {
        let period = Duration::from_secs(device.poll_interval_secs);
        Self {
            device,
            collector,
            sink,
            period,
        }
    }

    /// Override the polling period (the config interval is the default).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run until `cancel` fires.
    ///
    /// Cancellation is observed at the top of each cycle and during the
    /// inter-cycle sleep; an in-flight collect/append always completes.
    /// Sink write failures are fatal to this device's loop only.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        tracing::info!(
            device = %self.device.name,
            address = %self.device.address(),
            interval_secs = self.period.as_secs(),
            output = %self.sink.path().display(),
            "Starting poller"
        );

        while !cancel.is_cancelled() {
            let cycle_start = Instant::now();

            if let Some(sample) = self.collector.collect(&self.device).await {
                self.sink.append(&sample).await.with_context(|| {
                    format!("Failed to append sample for device '{}'", self.device.name)
                })?;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep_until(cycle_start + self.period) => {}
            }
        }

        tracing::info!(device = %self.device.name, "Poller stopped");
        Ok(())
    }
}
