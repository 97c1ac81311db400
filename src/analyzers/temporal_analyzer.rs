use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{District, TemporalTable};
use crate::utils::constants::WHO_24H_MEAN_PM25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub district: District,
    pub record_count: usize,
    pub first_timestamp: NaiveDateTime,
    pub last_timestamp: NaiveDateTime,
    pub min_pm25: f64,
    pub max_pm25: f64,
    pub mean_pm25: f64,
    pub mean_temperature: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub exceeds_who_24h: bool,
}

impl SelectionSummary {
    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== PM2.5 Summary ===\n");
        summary.push_str(&format!("District: {}\n", self.district));
        summary.push_str(&format!("Records: {}\n", self.record_count));
        summary.push_str(&format!(
            "Time span: {} to {}\n",
            self.first_timestamp, self.last_timestamp
        ));
        summary.push_str(&format!(
            "PM2.5: min {:.1}, mean {:.1}, max {:.1} μg/m³\n",
            self.min_pm25, self.mean_pm25, self.max_pm25
        ));

        if let Some(t) = self.mean_temperature {
            summary.push_str(&format!("Mean temperature: {:.1}°C\n", t));
        }
        if let Some(h) = self.mean_humidity {
            summary.push_str(&format!("Mean relative humidity: {:.1}%\n", h));
        }

        if self.exceeds_who_24h {
            summary.push_str(&format!(
                "⚠️  Mean exceeds the WHO 24-hour guideline of {} μg/m³\n",
                WHO_24H_MEAN_PM25
            ));
        } else {
            summary.push_str(&format!(
                "✅ Mean within the WHO 24-hour guideline of {} μg/m³\n",
                WHO_24H_MEAN_PM25
            ));
        }

        summary
    }
}

/// PM2.5 concentration over time, one point per record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl ChartSeries {
    /// Earliest and latest x values, whatever order the points are in
    pub fn x_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.points.iter().map(|(ts, _)| *ts).min()?;
        let max = self.points.iter().map(|(ts, _)| *ts).max()?;
        Some((min, max))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn describe(&self) -> String {
        match self.x_span() {
            Some((first, last)) => format!(
                "{}: {} points, {} to {}",
                self.title,
                self.points.len(),
                first.format("%H:%M"),
                last.format("%H:%M")
            ),
            None => format!("{}: no points", self.title),
        }
    }
}

pub struct TemporalAnalyzer;

impl TemporalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Summary statistics, or `None` when there is nothing to summarize
    pub fn summarize(&self, table: &TemporalTable) -> Option<SelectionSummary> {
        let records = table.records();
        let first = records.first()?;
        let last = records.last()?;

        let pm25: Vec<f64> = records.iter().map(|r| r.pm25_concentration).collect();
        let min_pm25 = pm25.iter().copied().fold(f64::INFINITY, f64::min);
        let max_pm25 = pm25.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_pm25 = mean(pm25.iter().copied())?;

        Some(SelectionSummary {
            district: table.district(),
            record_count: records.len(),
            first_timestamp: first.timestamp,
            last_timestamp: last.timestamp,
            min_pm25,
            max_pm25,
            mean_pm25,
            mean_temperature: mean(records.iter().filter_map(|r| r.temperature)),
            mean_humidity: mean(records.iter().filter_map(|r| r.relative_humidity)),
            exceeds_who_24h: mean_pm25 > WHO_24H_MEAN_PM25,
        })
    }

    pub fn chart_series(&self, table: &TemporalTable, title: &str) -> ChartSeries {
        ChartSeries {
            title: title.to_string(),
            x_label: "Time",
            y_label: "PM2.5 (μg/m³)",
            points: table
                .records()
                .iter()
                .map(|r| (r.timestamp, r.pm25_concentration))
                .collect(),
        }
    }
}

impl Default for TemporalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
