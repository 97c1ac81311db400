pub mod csv_writer;
pub mod xlsx_writer;

pub use csv_writer::CsvExporter;
pub use xlsx_writer::XlsxExporter;

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::{PortalError, Result};
use crate::models::{District, LoadReport, TemporalTable};
use crate::readers::{DistrictReader, XlsxReader};
use crate::utils::constants::{MIME_CSV, MIME_XLSX};
use crate::utils::filename::export_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => MIME_CSV,
            ExportFormat::Xlsx => MIME_XLSX,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PortalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(PortalError::UnsupportedExportFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Serialized table ready to hand to a download or write to disk
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write into `dir` (created if missing) under the artifact's filename
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Wrote export");
        Ok(path)
    }

    pub fn summary(&self) -> String {
        format!(
            "File: {}\nMIME type: {}\nSize: {} bytes",
            self.filename,
            self.mime_type,
            self.bytes.len()
        )
    }
}

/// Export a table, stamping the filename with today's date
pub fn export(table: &TemporalTable, format: ExportFormat) -> Result<ExportArtifact> {
    export_on(table, format, Local::now().date_naive())
}

/// Export a table with an explicit export date in the filename
pub fn export_on(
    table: &TemporalTable,
    format: ExportFormat,
    export_date: NaiveDate,
) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Csv => CsvExporter::new().write_records(table.records())?,
        ExportFormat::Xlsx => XlsxExporter::new().write_records(table.records())?,
    };

    Ok(ExportArtifact {
        filename: export_filename(table.district(), format.extension(), export_date),
        mime_type: format.mime_type(),
        format,
        bytes,
    })
}

/// Parse exported bytes back into a table
pub fn import(
    bytes: &[u8],
    format: ExportFormat,
    district: District,
) -> Result<(TemporalTable, LoadReport)> {
    let source_name = format!("{} export", format);
    match format {
        ExportFormat::Csv => DistrictReader::new().read_bytes(bytes, district, &source_name),
        ExportFormat::Xlsx => XlsxReader::new().read_bytes(bytes, district, &source_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemporalRecord;
    use chrono::NaiveDate;

    fn sample_table() -> TemporalTable {
        let base = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let records = (0..24)
            .map(|hour| {
                let ts = base.and_hms_opt(hour, 0, 0).unwrap();
                let temperature = if hour % 5 == 0 { None } else { Some(25.0 + hour as f64 / 10.0) };
                TemporalRecord::new(ts, 10.0 + hour as f64 * 0.37, temperature, Some(78.5))
            })
            .collect();
        TemporalTable::new(District::Kandy, records)
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!(matches!(
            "parquet".parse::<ExportFormat>(),
            Err(PortalError::UnsupportedExportFormat(_))
        ));
    }

    #[test]
    fn test_export_metadata() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let table = sample_table();

        let csv = export_on(&table, ExportFormat::Csv, date)?;
        assert_eq!(csv.filename, "pm25_temporal_data_Kandy_20240229.csv");
        assert_eq!(csv.mime_type, "text/csv");

        let xlsx = export_on(&table, ExportFormat::Xlsx, date)?;
        assert_eq!(xlsx.filename, "pm25_temporal_data_Kandy_20240229.xlsx");
        assert_eq!(
            xlsx.mime_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert!(xlsx.bytes.starts_with(b"PK"));

        Ok(())
    }

    #[test]
    fn test_csv_round_trip() -> Result<()> {
        let table = sample_table();
        let artifact = export(&table, ExportFormat::Csv)?;
        let (restored, report) = import(&artifact.bytes, ExportFormat::Csv, District::Kandy)?;

        assert_eq!(report.rows_dropped(), 0);
        assert_eq!(restored, table);
        Ok(())
    }

    #[test]
    fn test_csv_round_trip_keeps_fractional_seconds() -> Result<()> {
        let base = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let records = vec![
            TemporalRecord::new(base.and_hms_milli_opt(13, 0, 0, 250).unwrap(), 14.0, None, None),
            TemporalRecord::new(base.and_hms_opt(14, 0, 0).unwrap(), 15.0, None, None),
        ];
        let table = TemporalTable::new(District::Kandy, records);

        let artifact = export(&table, ExportFormat::Csv)?;
        let text = String::from_utf8(artifact.bytes.clone()).unwrap();
        assert!(text.contains("2023-06-15 13:00:00.250,"));
        assert!(text.contains("2023-06-15 14:00:00,"));

        let (restored, _) = import(&artifact.bytes, ExportFormat::Csv, District::Kandy)?;
        assert_eq!(restored, table);
        Ok(())
    }

    #[test]
    fn test_xlsx_round_trip() -> Result<()> {
        let table = sample_table();
        let artifact = export(&table, ExportFormat::Xlsx)?;
        let (restored, report) = import(&artifact.bytes, ExportFormat::Xlsx, District::Kandy)?;

        assert_eq!(report.rows_dropped(), 0);
        assert_eq!(restored, table);
        Ok(())
    }

    #[test]
    fn test_write_to_dir() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let artifact = export(&sample_table(), ExportFormat::Csv)?;
        let path = artifact.write_to_dir(&dir.path().join("exports"))?;

        assert!(path.exists());
        assert_eq!(std::fs::read(&path)?, artifact.bytes);
        Ok(())
    }
}
