use chrono::NaiveDate;

use crate::models::{District, TemporalRecord};
use crate::store::Selection;
use crate::utils::constants::{EXPORT_COLUMNS, EXPORT_TIMESTAMP_FORMAT};

/// `1234567` -> `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn no_data_message(district: District, date: NaiveDate) -> String {
    format!("No data available for {} on {}.", district, date)
}

pub fn selection_header(selection: &Selection) -> String {
    format!(
        "Filtered Records for {} on {}: {}",
        selection.district,
        selection.date,
        format_count(selection.len())
    )
}

/// Plain-text grid of a selection
pub struct TableView {
    limit: Option<usize>,
}

impl TableView {
    pub fn new() -> Self {
        Self { limit: None }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }

    /// The grid, or the explicit no-data message for an empty selection
    pub fn render(&self, selection: &Selection) -> String {
        if selection.is_empty() {
            return no_data_message(selection.district, selection.date);
        }

        let records = selection.records.records();
        let shown = self.limit.map_or(records.len(), |n| n.min(records.len()));

        let rows: Vec<[String; 8]> = records[..shown].iter().map(row_cells).collect();

        let mut widths: Vec<usize> = EXPORT_COLUMNS.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, EXPORT_COLUMNS.iter().copied(), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        for row in &rows {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }

        if shown < records.len() {
            out.push_str(&format!(
                "... {} more rows\n",
                format_count(records.len() - shown)
            ));
        }

        out
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

fn row_cells(record: &TemporalRecord) -> [String; 8] {
    let optional = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    [
        record.timestamp.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
        format!("{:.2}", record.pm25_concentration),
        optional(record.temperature),
        optional(record.relative_humidity),
        record.hour.to_string(),
        record.day.to_string(),
        record.day_of_week.to_string(),
        record.month.to_string(),
    ]
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, w)| format!("{:>width$}", cell, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
