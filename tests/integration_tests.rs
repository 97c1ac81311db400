use chrono::{Duration, NaiveDate, NaiveDateTime};
use pm25_portal::analyzers::TemporalAnalyzer;
use pm25_portal::cli::explore;
use pm25_portal::config::PortalConfig;
use pm25_portal::models::District;
use pm25_portal::store::TemporalRecordStore;
use pm25_portal::views::TableView;
use pm25_portal::writers::{export_on, import, ExportFormat};
use pm25_portal::PortalError;
use pretty_assertions::assert_eq;
use std::fmt::Write as _;
use std::fs;
use tempfile::TempDir;

const HEADER: &str = "timestamp_index,PM2.5 (ug/m3),Temperature (Celsius),Relative Humidity (%),hour,day,dayofweek,month";

/// A full year of hourly Kandy readings for 2023
fn write_kandy_year(dir: &TempDir) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut body = format!("{}\n", HEADER);
    for i in 0..8760 {
        let ts: NaiveDateTime = start + Duration::hours(i);
        writeln!(
            body,
            "{},{:.1},{:.1},{:.1},0,0,0,0",
            ts.format("%Y-%m-%d %H:%M:%S"),
            10.0 + (i % 24) as f64,
            22.0 + (i % 5) as f64,
            70.0 + (i % 7) as f64
        )
        .unwrap();
    }

    fs::write(dir.path().join("Cleaned_Kandy.xls"), body).unwrap();
}

fn store_for(dir: &TempDir) -> TemporalRecordStore {
    TemporalRecordStore::new(PortalConfig::default().with_data_dir(dir.path().to_string_lossy()))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn test_kandy_day_selection() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_kandy_year(&dir);
    let mut store = store_for(&dir);

    let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
    let selection = store.query(District::Kandy, date, today())?;

    assert_eq!(selection.len(), 24);
    assert!(selection.records.records().iter().all(|r| r.date() == date));

    let loaded = store.table_for(District::Kandy)?;
    assert_eq!(loaded.table.len(), 8760);
    assert_eq!(loaded.report.rows_dropped(), 0);
    assert_eq!(store.load_count(), 1);

    let chart = TemporalAnalyzer::new().chart_series(&selection.records, "Kandy");
    assert_eq!(chart.describe(), "Kandy: 24 points, 00:00 to 23:00");

    // Calendar parts come from the timestamp, not the file's placeholder zeros
    let first = &selection.records.records()[0];
    assert_eq!((first.day, first.month, first.day_of_week), (15, 6, 3));

    Ok(())
}

#[test]
fn test_missing_district_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut store = store_for(&dir);

    let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
    let err = store.query(District::Jaffna, date, today()).unwrap_err();

    assert_eq!(err.to_string(), "CSV file for Jaffna not found!");
    assert!(err.is_recoverable());
    assert_eq!(store.cached_district(), None);

    Ok(())
}

#[test]
fn test_date_without_records() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_kandy_year(&dir);
    let mut store = store_for(&dir);

    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let selection = store.query(District::Kandy, date, today())?;

    assert!(selection.is_empty());
    assert_eq!(
        TableView::new().render(&selection),
        "No data available for Kandy on 2024-02-29."
    );
    assert!(TemporalAnalyzer::new().summarize(&selection.records).is_none());

    Ok(())
}

#[test]
fn test_date_before_minimum_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_kandy_year(&dir);
    let mut store = store_for(&dir);

    let date = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
    let err = store.query(District::Kandy, date, today()).unwrap_err();

    assert!(matches!(err, PortalError::DateOutOfRange { .. }));
    assert_eq!(store.load_count(), 0);

    Ok(())
}

#[test]
fn test_exports_round_trip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_kandy_year(&dir);
    let mut store = store_for(&dir);

    let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
    let selection = store.query(District::Kandy, date, today())?;
    let export_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
        let artifact = export_on(&selection.records, format, export_date)?;
        assert_eq!(
            artifact.filename,
            format!("pm25_temporal_data_Kandy_20240601.{}", format.extension())
        );

        let (table, report) = import(&artifact.bytes, format, District::Kandy)?;
        assert_eq!(report.rows_dropped(), 0);
        assert_eq!(table, selection.records);

        let out_dir = dir.path().join("exports");
        let path = artifact.write_to_dir(&out_dir)?;
        assert_eq!(fs::read(path)?, artifact.bytes);
    }

    Ok(())
}

#[test]
fn test_explore_reuses_loaded_district() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_kandy_year(&dir);
    let mut store = store_for(&dir);

    let input = "Kandy 2023-06-15\nKandy 2023-06-16\nJaffna 2023-06-15\n";
    let mut output = Vec::new();
    explore(&mut store, input.as_bytes(), &mut output, today(), 3)?;
    let output = String::from_utf8(output)?;

    assert!(output.contains("Filtered Records for Kandy on 2023-06-15: 24"));
    assert!(output.contains("Filtered Records for Kandy on 2023-06-16: 24"));
    assert!(output.contains("... 21 more rows"));
    assert!(output.contains("CSV file for Jaffna not found!"));
    assert_eq!(store.load_count(), 1);

    Ok(())
}
