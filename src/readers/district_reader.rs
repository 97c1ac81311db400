use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{PortalError, Result};
use crate::models::{District, LoadReport, TemporalTable};
use crate::readers::schema::{assemble_record, parse_measurement, ColumnMap};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::utils::timestamp::parse_timestamp;

/// Reads a district's delimited-text table into typed records.
///
/// The processed files carry an `.xls` extension but are plain CSV, so the
/// extension is never inspected.
pub struct DistrictReader {
    delimiter: u8,
}

impl DistrictReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read the backing file for `district`
    pub fn read_district(
        &self,
        path: &Path,
        district: District,
    ) -> Result<(TemporalTable, LoadReport)> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PortalError::MissingDataFile { district })
            }
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let source_name = path.display().to_string();
        self.read_bytes(&bytes, district, &source_name)
    }

    /// Parse an in-memory table, e.g. a re-imported CSV export
    pub fn read_bytes(
        &self,
        bytes: &[u8],
        district: District,
        source_name: &str,
    ) -> Result<(TemporalTable, LoadReport)> {
        let text = decode_text(bytes);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        let columns = ColumnMap::from_headers(&headers, source_name)?;

        let mut report = LoadReport::default();
        let mut records = Vec::new();

        for row in csv_reader.records() {
            let row = row?;

            // Skip blank trailing lines
            if row.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("");

            let record = assemble_record(
                parse_timestamp(cell(Some(columns.timestamp))),
                parse_measurement(cell(Some(columns.pm25))),
                parse_measurement(cell(columns.temperature)),
                parse_measurement(cell(columns.humidity)),
                &mut report,
            );

            if let Some(record) = record {
                records.push(record);
            }
        }

        log_report(district, source_name, &report);
        Ok((TemporalTable::new(district, records), report))
    }
}

impl Default for DistrictReader {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn log_report(district: District, source_name: &str, report: &LoadReport) {
    debug!(
        %district,
        source = source_name,
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        "Loaded temporal table"
    );

    if report.rows_dropped() > 0 {
        warn!(
            %district,
            source = source_name,
            malformed_timestamps = report.malformed_timestamps,
            invalid_pm25 = report.invalid_pm25,
            "Dropped {} unusable rows",
            report.rows_dropped()
        );
    }
}

/// UTF-8 (BOM stripped) when valid, otherwise Windows-1252 as written by Excel
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }

    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}
