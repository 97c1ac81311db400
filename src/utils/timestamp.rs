use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Date-time layouts seen in processed station exports
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a timestamp cell leniently. Returns `None` for anything unrecognised.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    // Offset-aware values keep their wall-clock time
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn excel_epoch() -> NaiveDateTime {
    // Day zero of the 1900 date system, shifted past the 1900 leap-year bug
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Spreadsheet serial date-time (fractional days since 1899-12-30)
pub fn to_excel_serial(ts: NaiveDateTime) -> f64 {
    let delta = ts - excel_epoch();
    delta.num_milliseconds() as f64 / (SECONDS_PER_DAY * 1000.0)
}

/// Inverse of [`to_excel_serial`], rounded to the nearest second
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let seconds = (serial * SECONDS_PER_DAY).round();
    if seconds > i64::MAX as f64 {
        return None;
    }

    let delta = Duration::try_seconds(seconds as i64)?;
    excel_epoch().checked_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_common_layouts() {
        let expected = ts(2023, 6, 15, 13, 0, 0);
        assert_eq!(parse_timestamp("2023-06-15 13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-06-15T13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-06-15 13:00"), Some(expected));
        assert_eq!(parse_timestamp("15/06/2023 13:00"), Some(expected));
        assert_eq!(parse_timestamp("  2023-06-15 13:00:00  "), Some(expected));
        assert_eq!(parse_timestamp("2023-06-15T13:00:00+05:30"), Some(expected));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let parsed = parse_timestamp("2023-06-15 13:00:00.250").unwrap();
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        assert_eq!(parse_timestamp("2023-06-15"), Some(ts(2023, 6, 15, 0, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2023-13-45 99:00:00"), None);
    }

    #[test]
    fn test_excel_serial_known_values() {
        // 2023-01-01 is serial 44927
        assert_eq!(to_excel_serial(ts(2023, 1, 1, 0, 0, 0)), 44927.0);
        assert_eq!(to_excel_serial(ts(2023, 1, 1, 12, 0, 0)), 44927.5);
        assert_eq!(from_excel_serial(44927.5), Some(ts(2023, 1, 1, 12, 0, 0)));
    }

    #[test]
    fn test_excel_serial_restores_seconds() {
        let original = ts(2023, 6, 15, 23, 59, 59);
        assert_eq!(from_excel_serial(to_excel_serial(original)), Some(original));
    }

    #[test]
    fn test_excel_serial_rejects_invalid() {
        assert_eq!(from_excel_serial(f64::NAN), None);
        assert_eq!(from_excel_serial(-1.0), None);
        assert_eq!(from_excel_serial(1e300), None);
    }
}
