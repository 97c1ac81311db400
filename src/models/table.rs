use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{District, TemporalRecord};

/// Ordered, schema-checked records for one district
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalTable {
    district: District,
    records: Vec<TemporalRecord>,
}

impl TemporalTable {
    pub fn new(district: District, records: Vec<TemporalRecord>) -> Self {
        Self { district, records }
    }

    pub fn district(&self) -> District {
        self.district
    }

    pub fn records(&self) -> &[TemporalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows whose timestamp falls on `date`, in file order
    pub fn filter_by_date(&self, date: NaiveDate) -> TemporalTable {
        let records = self
            .records
            .iter()
            .filter(|r| r.date() == date)
            .cloned()
            .collect();

        TemporalTable::new(self.district, records)
    }

    /// Earliest and latest timestamps (file order is not assumed sorted)
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.records.iter().map(|r| r.timestamp).min()?;
        let max = self.records.iter().map(|r| r.timestamp).max()?;
        Some((min, max))
    }

    pub fn distinct_dates(&self) -> BTreeSet<NaiveDate> {
        self.records.iter().map(|r| r.date()).collect()
    }
}

/// Outcome of parsing one backing file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub malformed_timestamps: usize,
    pub invalid_pm25: usize,
}

impl LoadReport {
    pub fn rows_dropped(&self) -> usize {
        self.malformed_timestamps + self.invalid_pm25
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Rows read: {}\nRows kept: {}\n",
            self.rows_read, self.rows_kept
        );
        if self.rows_dropped() > 0 {
            summary.push_str(&format!(
                "Rows dropped: {} (malformed timestamp: {}, invalid PM2.5: {})\n",
                self.rows_dropped(),
                self.malformed_timestamps,
                self.invalid_pm25
            ));
        }
        summary
    }
}
