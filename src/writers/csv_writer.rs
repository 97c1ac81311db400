use serde::Serialize;

use crate::error::{PortalError, Result};
use crate::models::TemporalRecord;
use crate::utils::constants::{EXPORT_COLUMNS, EXPORT_TIMESTAMP_FORMAT};

/// Row layout for CSV exports; headers match the processed source files
#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "timestamp_index")]
    timestamp: String,
    #[serde(rename = "PM2.5 (ug/m3)")]
    pm25_concentration: f64,
    #[serde(rename = "Temperature (Celsius)")]
    temperature: Option<f64>,
    #[serde(rename = "Relative Humidity (%)")]
    relative_humidity: Option<f64>,
    hour: u32,
    day: u32,
    #[serde(rename = "dayofweek")]
    day_of_week: u32,
    month: u32,
}

impl From<&TemporalRecord> for CsvRow {
    fn from(record: &TemporalRecord) -> Self {
        Self {
            timestamp: record.timestamp.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
            pm25_concentration: record.pm25_concentration,
            temperature: record.temperature,
            relative_humidity: record.relative_humidity,
            hour: record.hour,
            day: record.day,
            day_of_week: record.day_of_week,
            month: record.month,
        }
    }
}

pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize records to CSV bytes. An empty slice still yields the header.
    pub fn write_records(&self, records: &[TemporalRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(EXPORT_COLUMNS)?;
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }

        writer
            .into_inner()
            .map_err(|e| PortalError::Io(e.into_error()))
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}
