use anyhow::{Result, anyhow};
use snmp2::Oid;

/// sysName.0 (SNMPv2-MIB).
pub const SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";

/// sysDescr.0 (SNMPv2-MIB).
pub const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";

/// hrProcessorLoad.1 (HOST-RESOURCES-MIB, first processor).
pub const HR_PROCESSOR_LOAD: &str = "1.3.6.1.2.1.25.3.3.1.2.1";

/// Parse an OID string (e.g., "1.3.6.1.2.1.1.5.0") into an snmp2::Oid.
pub fn parse_oid(oid_str: &str) -> Result<Oid<'static>> {
    oid_str
        .parse::<Oid>()
        .map_err(|e| anyhow!("Failed to parse OID '{}': {:?}", oid_str, e))
        .map(|oid| oid.to_owned())
}

/// Convert an snmp2::Oid back to a dotted string representation.
pub fn oid_to_string(oid: &Oid) -> String {
    oid.to_id_string()
}

/// The fixed set of health metrics polled from every device.
///
/// Field order is the query order, which is also the CSV column order of the
/// value columns.
pub struct MetricSet {
    names: Vec<&'static str>,
    oids: Vec<Oid<'static>>,
}

impl MetricSet {
    /// Build the sysName/sysDescr/hrProcessorLoad set, parsing each OID once.
    pub fn system_health() -> Result<Self> {
        let entries = [
            ("sysName", SYS_NAME),
            ("sysDescr", SYS_DESCR),
            ("hrProcessorLoad", HR_PROCESSOR_LOAD),
        ];

        let mut names = Vec::with_capacity(entries.len());
        let mut oids = Vec::with_capacity(entries.len());
        for (name, oid_str) in entries {
            names.push(name);
            oids.push(parse_oid(oid_str)?);
        }

        Ok(Self { names, oids })
    }

    /// OIDs in query order.
    pub fn oids(&self) -> &[Oid<'static>] {
        &self.oids
    }

    /// Field names in query order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Resolve a 1-based SNMP error index to the queried field name.
    pub fn field_at(&self, index: u32) -> Option<&'static str> {
        if index == 0 {
            return None;
        }
        self.names.get(index as usize - 1).copied()
    }
}
