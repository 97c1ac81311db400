use chrono::NaiveDate;
use thiserror::Error;

use crate::models::District;

pub type Result<T> = std::result::Result<T, PortalError>;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Spreadsheet XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Spreadsheet XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("CSV file for {district} not found!")]
    MissingDataFile { district: District },

    #[error("Required column '{column}' missing from {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Unknown district: '{0}'")]
    UnknownDistrict(String),

    #[error("Date {date} is outside the available range {min} to {max}")]
    DateOutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported export format: '{0}' (expected csv or xlsx)")]
    UnsupportedExportFormat(String),
}

impl PortalError {
    /// Errors that end the current request but leave the session usable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PortalError::MissingDataFile { .. }
                | PortalError::UnknownDistrict(_)
                | PortalError::DateOutOfRange { .. }
        )
    }
}
