use chrono::{DateTime, Local};

/// CSV column names, in row order.
pub const CSV_HEADER: [&str; 4] = ["Timestamp", "System Name", "System Description", "CPU Load"];

/// Wall-clock format used for the Timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One timestamped set of metric values collected from a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock time the values were collected, second precision.
    pub timestamp: DateTime<Local>,
    pub system_name: String,
    pub system_description: String,
    pub cpu_load: String,
}

impl Sample {
    /// Build a sample stamped with the current wall-clock time.
    pub fn now(system_name: String, system_description: String, cpu_load: String) -> Self {
        Self {
            timestamp: Local::now(),
            system_name,
            system_description,
            cpu_load,
        }
    }

    /// The sample's fields in CSV column order.
    pub fn csv_fields(&self) -> [String; 4] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.system_name.clone(),
            self.system_description.clone(),
            self.cpu_load.clone(),
        ]
    }
}
