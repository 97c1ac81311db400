/// Source column names
pub const COL_TIMESTAMP: &str = "timestamp_index";
pub const COL_PM25: &str = "PM2.5 (ug/m3)";
pub const COL_TEMPERATURE: &str = "Temperature (Celsius)";
pub const COL_HUMIDITY: &str = "Relative Humidity (%)";
pub const COL_HOUR: &str = "hour";
pub const COL_DAY: &str = "day";
pub const COL_DAY_OF_WEEK: &str = "dayofweek";
pub const COL_MONTH: &str = "month";

/// Column order used by table views and exports
pub const EXPORT_COLUMNS: [&str; 8] = [
    COL_TIMESTAMP,
    COL_PM25,
    COL_TEMPERATURE,
    COL_HUMIDITY,
    COL_HOUR,
    COL_DAY,
    COL_DAY_OF_WEEK,
    COL_MONTH,
];

/// Data location defaults
pub const DEFAULT_DATA_DIR: &str = "new processed";
pub const DEFAULT_FILE_EXTENSION: &str = "xls";
pub const DEFAULT_MIN_DATE: &str = "2023-01-01";
pub const CONFIG_FILE_NAME: &str = "pm25-portal";
pub const ENV_PREFIX: &str = "PM25";

/// Export formatting
/// Fractional seconds are written only when present
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub const EXPORT_FILE_PREFIX: &str = "pm25_temporal_data";
pub const SHEET_NAME: &str = "PM25_Temporal";
pub const MIME_CSV: &str = "text/csv";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// WHO 24-hour air quality guideline (μg/m³)
pub const WHO_24H_MEAN_PM25: f64 = 15.0;

pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
