use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

/// One ground-station observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TemporalRecord {
    pub timestamp: NaiveDateTime,

    // μg/m³
    #[validate(range(min = 0.0))]
    pub pm25_concentration: f64,

    // °C
    pub temperature: Option<f64>,

    // %
    pub relative_humidity: Option<f64>,

    pub hour: u32,
    pub day: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub month: u32,
}

impl TemporalRecord {
    /// Build a record, deriving the calendar parts from the timestamp
    pub fn new(
        timestamp: NaiveDateTime,
        pm25_concentration: f64,
        temperature: Option<f64>,
        relative_humidity: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            pm25_concentration,
            temperature,
            relative_humidity,
            hour: timestamp.hour(),
            day: timestamp.day(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
            month: timestamp.month(),
        }
    }

    /// Build and validate a record
    pub fn checked(
        timestamp: NaiveDateTime,
        pm25_concentration: f64,
        temperature: Option<f64>,
        relative_humidity: Option<f64>,
    ) -> Result<Self> {
        let record = Self::new(timestamp, pm25_concentration, temperature, relative_humidity);
        record.validate()?;
        Ok(record)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_derived_calendar_parts() {
        // 2023-06-15 was a Thursday
        let record = TemporalRecord::new(at(2023, 6, 15, 13), 21.4, Some(29.1), Some(74.0));

        assert_eq!(record.hour, 13);
        assert_eq!(record.day, 15);
        assert_eq!(record.day_of_week, 3);
        assert_eq!(record.month, 6);
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
    }

    #[test]
    fn test_negative_pm25_rejected() {
        assert!(TemporalRecord::checked(at(2023, 1, 1, 0), -0.5, None, None).is_err());
        assert!(TemporalRecord::checked(at(2023, 1, 1, 0), 0.0, None, None).is_ok());
    }

    #[test]
    fn test_sunday_is_six() {
        let record = TemporalRecord::new(at(2023, 6, 18, 0), 10.0, None, None);
        assert_eq!(record.day_of_week, 6);
    }
}
