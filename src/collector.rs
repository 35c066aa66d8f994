use anyhow::Result;

use crate::config::DeviceConfig;
use crate::oid::MetricSet;
use crate::sample::Sample;
use crate::transport::QueryTransport;

/// Collects one health sample from one device per call.
pub struct Collector<T> {
    transport: T,
    metrics: MetricSet,
}

impl<T: QueryTransport> Collector<T> {
    /// Create a collector, parsing the metric OID set once up front.
    pub fn new(transport: T) -> Result<Self> {
        Ok(Self {
            transport,
            metrics: MetricSet::system_health()?,
        })
    }

    /// Run one polling cycle for `device`.
    ///
    /// Transport and protocol failures are logged and yield `None`; the only
    /// retry is the scheduler's next tick. Never writes to the sink.
    pub async fn collect(&self, device: &DeviceConfig) -> Option<Sample> {
        let response = match self.transport.query(device, self.metrics.oids()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(device = %device.name, error = %e, "SNMP query failed");
                return None;
            }
        };

        if response.error_status != 0 {
            let field = self.metrics.field_at(response.error_index).unwrap_or("?");
            tracing::warn!(
                device = %device.name,
                status = error_status_name(response.error_status),
                index = response.error_index,
                field,
                "Device returned SNMP error"
            );
            return None;
        }

        if response.values.len() != self.metrics.names().len() {
            tracing::warn!(
                device = %device.name,
                expected = self.metrics.names().len(),
                returned = response.values.len(),
                "Short SNMP response"
            );
            return None;
        }

        // Query order: sysName, sysDescr, hrProcessorLoad.
        let mut values = response.values.into_iter();
        let system_name = values.next()?;
        let system_description = values.next()?;
        let cpu_load = values.next()?;

        Some(Sample::now(system_name, system_description, cpu_load))
    }
}

/// RFC 1905 error-status names, for log messages.
fn error_status_name(status: u32) -> &'static str {
    match status {
        0 => "noError",
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        _ => "unknown",
    }
}
