use chrono::NaiveDate;

use crate::models::District;
use crate::utils::constants::EXPORT_FILE_PREFIX;

/// Export filename with format: pm25_temporal_data_{District}_{YYYYMMDD}.{ext}
pub fn export_filename(district: District, extension: &str, export_date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.{}",
        EXPORT_FILE_PREFIX,
        district.name(),
        export_date.format("%Y%m%d"),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            export_filename(District::Kandy, "csv", date),
            "pm25_temporal_data_Kandy_20240307.csv"
        );
        assert_eq!(
            export_filename(District::PointPedro, "xlsx", date),
            "pm25_temporal_data_PointPedro_20240307.xlsx"
        );
    }
}
