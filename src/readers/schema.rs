use chrono::NaiveDateTime;

use crate::error::{PortalError, Result};
use crate::models::{LoadReport, TemporalRecord};
use crate::utils::constants::{COL_HUMIDITY, COL_PM25, COL_TEMPERATURE, COL_TIMESTAMP};

/// Positions of the known columns in a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub timestamp: usize,
    pub pm25: usize,
    pub temperature: Option<usize>,
    pub humidity: Option<usize>,
}

impl ColumnMap {
    /// Resolve columns by name. Timestamp and PM2.5 are required; the
    /// precomputed calendar columns and anything else are ignored.
    pub fn from_headers<S: AsRef<str>>(headers: &[S], source_name: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name)
                .or_else(|| {
                    headers
                        .iter()
                        .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
                })
        };

        let required = |name: &str| {
            find(name).ok_or_else(|| PortalError::MissingColumn {
                column: name.to_string(),
                source_name: source_name.to_string(),
            })
        };

        Ok(Self {
            timestamp: required(COL_TIMESTAMP)?,
            pm25: required(COL_PM25)?,
            temperature: find(COL_TEMPERATURE),
            humidity: find(COL_HUMIDITY),
        })
    }
}

/// Parse an optional numeric cell. Blank, `NaN` and non-finite values are absent.
pub fn parse_measurement(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Turn one row's parsed cells into a record, tallying drops in `report`.
///
/// Rows without a usable timestamp, or with a missing or negative PM2.5
/// value, are dropped rather than failing the load.
pub fn assemble_record(
    timestamp: Option<NaiveDateTime>,
    pm25: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    report: &mut LoadReport,
) -> Option<TemporalRecord> {
    report.rows_read += 1;

    let Some(timestamp) = timestamp else {
        report.malformed_timestamps += 1;
        return None;
    };

    let record = pm25.and_then(|value| {
        TemporalRecord::checked(timestamp, value, temperature, humidity).ok()
    });

    match record {
        Some(record) => {
            report.rows_kept += 1;
            Some(record)
        }
        None => {
            report.invalid_pm25 += 1;
            None
        }
    }
}
