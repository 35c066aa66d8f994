use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use snmp2::{AsyncSession, Oid, Value};
use tokio::time::timeout;

use crate::config::DeviceConfig;
use crate::oid::oid_to_string;

/// Decoded outcome of one SNMP request.
///
/// Protocol-level errors reported by the device arrive as a non-zero
/// `error_status` with a 1-based `error_index`; transport-level failures are
/// returned as `Err` by [`QueryTransport::query`] instead.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub error_status: u32,
    pub error_index: u32,
    /// Values in query order, rendered in their human-readable string form.
    pub values: Vec<String>,
}

/// Request/response seam used by the collector.
pub trait QueryTransport: Send + Sync {
    /// Fetch the values for `oids` from `device` in a single request.
    fn query(
        &self,
        device: &DeviceConfig,
        oids: &[Oid<'static>],
    ) -> impl Future<Output = Result<QueryResponse>> + Send;
}

/// Production transport backed by snmp2 over UDP (SNMPv2c, community auth).
#[derive(Debug, Clone)]
pub struct SnmpTransport {
    request_timeout: Duration,
}

impl SnmpTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl QueryTransport for SnmpTransport {
    async fn query(
        &self,
        device: &DeviceConfig,
        oids: &[Oid<'static>],
    ) -> Result<QueryResponse> {
        let address = device.address();
        let mut session = AsyncSession::new_v2c(&address, device.community.as_bytes(), 0)
            .await
            .context("Failed to create SNMPv2c session")?;

        // One GET per varbind on a single session; a protocol error on the
        // k-th varbind is reported with a 1-based error_index of k.
        let mut values = Vec::with_capacity(oids.len());
        for (position, oid) in oids.iter().enumerate() {
            let response = timeout(self.request_timeout, session.get(oid))
                .await
                .map_err(|_| anyhow!("SNMP request timed out"))?
                .context("SNMP request failed")?;

            if response.error_status != 0 {
                return Ok(QueryResponse {
                    error_status: response.error_status,
                    error_index: position as u32 + 1,
                    values: Vec::new(),
                });
            }

            match response.varbinds.into_iter().next() {
                Some((_oid, value)) => values.push(value_to_string(&value)),
                None => return Err(anyhow!("Empty response for OID {}", oid_to_string(oid))),
            }
        }

        Ok(QueryResponse {
            error_status: 0,
            error_index: 0,
            values,
        })
    }
}

/// Render an SNMP value in its human-readable string form.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        Value::OctetString(s) => match std::str::from_utf8(s) {
            Ok(text) => text.to_string(),
            Err(_) => s
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(":"),
        },
        Value::ObjectIdentifier(oid) => oid_to_string(oid),
        Value::IpAddress(ip) => format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Null => String::new(),
        Value::NoSuchObject => "noSuchObject".to_string(),
        Value::NoSuchInstance => "noSuchInstance".to_string(),
        Value::EndOfMibView => "endOfMibView".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::parse_oid;

    #[test]
    fn test_value_to_string_numeric() {
        assert_eq!(value_to_string(&Value::Integer(12)), "12");
        assert_eq!(value_to_string(&Value::Counter32(42)), "42");
        assert_eq!(value_to_string(&Value::Counter64(1234567890123)), "1234567890123");
        assert_eq!(value_to_string(&Value::Timeticks(100)), "100");
    }

    #[test]
    fn test_value_to_string_text() {
        assert_eq!(value_to_string(&Value::OctetString(b"Linux 5.10")), "Linux 5.10");
        assert_eq!(value_to_string(&Value::OctetString(&[0xff, 0x00])), "ff:00");
    }

    #[test]
    fn test_value_to_string_address_and_oid() {
        assert_eq!(
            value_to_string(&Value::IpAddress([192, 0, 2, 5])),
            "192.0.2.5"
        );

        let oid = parse_oid("1.3.6.1.2.1.1.5.0").unwrap();
        assert_eq!(value_to_string(&Value::ObjectIdentifier(oid)), "1.3.6.1.2.1.1.5.0");
    }

    #[test]
    fn test_value_to_string_absent_values() {
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&Value::NoSuchInstance), "noSuchInstance");
        assert_eq!(value_to_string(&Value::EndOfMibView), "endOfMibView");
    }
}
