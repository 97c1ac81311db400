use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::{PortalError, Result};
use crate::models::{District, LoadReport, TemporalTable};
use crate::readers::district_reader::log_report;
use crate::readers::schema::{assemble_record, parse_measurement, ColumnMap};
use crate::utils::timestamp::{from_excel_serial, parse_timestamp};

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const FIRST_SHEET_PART: &str = "xl/worksheets/sheet1.xml";

/// A worksheet cell after type resolution
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => parse_measurement(s),
            _ => None,
        }
    }

    fn as_timestamp(&self) -> Option<chrono::NaiveDateTime> {
        match self {
            CellValue::Number(serial) => from_excel_serial(*serial),
            CellValue::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

/// Reads the first worksheet of an `.xlsx` workbook back into records
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_bytes(
        &self,
        bytes: &[u8],
        district: District,
        source_name: &str,
    ) -> Result<(TemporalTable, LoadReport)> {
        let rows = self.read_rows(bytes)?;

        let mut rows = rows.into_iter();
        let header_row = rows.next().ok_or_else(|| {
            PortalError::InvalidFormat(format!("Worksheet in {} has no header row", source_name))
        })?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|c| c.as_text().unwrap_or("").to_string())
            .collect();
        let columns = ColumnMap::from_headers(&headers, source_name)?;

        let mut report = LoadReport::default();
        let mut records = Vec::new();

        for row in rows {
            if row.iter().all(|c| *c == CellValue::Empty) {
                continue;
            }

            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or(&CellValue::Empty);

            let record = assemble_record(
                cell(Some(columns.timestamp)).as_timestamp(),
                cell(Some(columns.pm25)).as_number(),
                cell(columns.temperature).as_number(),
                cell(columns.humidity).as_number(),
                &mut report,
            );

            if let Some(record) = record {
                records.push(record);
            }
        }

        log_report(district, source_name, &report);
        Ok((TemporalTable::new(district, records), report))
    }

    /// All rows of the first worksheet, with sparse cells filled as `Empty`
    pub fn read_rows(&self, bytes: &[u8]) -> Result<Vec<Vec<CellValue>>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let shared_strings = match archive.by_name(SHARED_STRINGS_PART) {
            Ok(mut part) => {
                let mut xml = String::new();
                part.read_to_string(&mut xml)?;
                parse_shared_strings(&xml)?
            }
            Err(zip::result::ZipError::FileNotFound) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut sheet_xml = String::new();
        archive
            .by_name(FIRST_SHEET_PART)?
            .read_to_string(&mut sheet_xml)?;

        parse_sheet(&sheet_xml, &shared_strings)
    }
}

impl Default for XlsxReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Text(e) if in_text => current.push_str(&e.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Cell under construction while its `<c>` element is open
struct PendingCell {
    column: Option<usize>,
    kind: Option<String>,
    raw: String,
}

fn parse_sheet(xml: &str, shared_strings: &[String]) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut row: Vec<CellValue> = Vec::new();
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => cell = Some(start_cell(&e)?),
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"row" => rows.push(Vec::new()),
            Event::Text(e) if in_value => {
                if let Some(pending) = cell.as_mut() {
                    pending.raw.push_str(&e.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        let column = pending.column.unwrap_or(row.len());
                        let value = resolve_cell(pending, shared_strings)?;
                        place_cell(&mut row, column, value);
                    }
                }
                b"row" => rows.push(std::mem::take(&mut row)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn start_cell(element: &BytesStart) -> Result<PendingCell> {
    let mut pending = PendingCell {
        column: None,
        kind: None,
        raw: String::new(),
    };

    for attr in element.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"r" => {
                let reference = attr.unescape_value()?;
                let column = column_index(&reference).ok_or_else(|| {
                    PortalError::InvalidFormat(format!("Invalid cell reference '{}'", reference))
                })?;
                pending.column = Some(column);
            }
            b"t" => pending.kind = Some(attr.unescape_value()?.into_owned()),
            _ => {}
        }
    }

    Ok(pending)
}

fn resolve_cell(pending: PendingCell, shared_strings: &[String]) -> Result<CellValue> {
    let raw = pending.raw;
    let value = match pending.kind.as_deref() {
        Some("s") => {
            let idx: usize = raw.trim().parse().map_err(|_| {
                PortalError::InvalidFormat(format!("Invalid shared string index '{}'", raw))
            })?;
            let text = shared_strings.get(idx).ok_or_else(|| {
                PortalError::InvalidFormat(format!("Shared string {} out of range", idx))
            })?;
            CellValue::Text(text.clone())
        }
        Some("inlineStr") | Some("str") | Some("e") => CellValue::Text(raw),
        Some("b") => CellValue::Bool(raw.trim() == "1"),
        _ if raw.trim().is_empty() => CellValue::Empty,
        _ => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(raw),
        },
    };
    Ok(value)
}

fn place_cell(row: &mut Vec<CellValue>, column: usize, value: CellValue) {
    if row.len() <= column {
        row.resize(column + 1, CellValue::Empty);
    }
    row[column] = value;
}

/// Columns in a worksheet (`A` to `XFD`)
pub const MAX_COLUMNS: usize = 16_384;

/// Zero-based column from an A1-style reference: `A1` -> 0, `AB12` -> 27.
/// `None` when there are no letters or the column is past `XFD`.
pub fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();

    if letters.is_empty() {
        return None;
    }

    let number = letters.iter().try_fold(0usize, |acc, b| {
        acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
    })?;

    (number <= MAX_COLUMNS).then(|| number - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("H9"), Some(7));
        assert_eq!(column_index("Z3"), Some(25));
        assert_eq!(column_index("AA3"), Some(26));
        assert_eq!(column_index("ab12"), Some(27));
        assert_eq!(column_index("12"), None);
        assert_eq!(column_index("XFD1"), Some(MAX_COLUMNS - 1));
        assert_eq!(column_index("XFE1"), None);
        assert_eq!(column_index("ZZZZZZZZZZZZZZZ1"), None);
    }

    #[test]
    fn test_oversized_cell_reference_is_rejected() {
        let xml = r#"<worksheet><sheetData>
    <row r="1"><c r="ZZZZZZZZZZZZZZZ1"><v>1</v></c></row>
  </sheetData></worksheet>"#;
        assert!(matches!(
            parse_sheet(xml, &[]),
            Err(PortalError::InvalidFormat(_))
        ));

        let xml = r#"<worksheet><sheetData>
    <row r="1"><c r="17"><v>1</v></c></row>
  </sheetData></worksheet>"#;
        assert!(matches!(
            parse_sheet(xml, &[]),
            Err(PortalError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_sheet_with_shared_and_inline_strings() -> Result<()> {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="inlineStr"><is><t>PM2.5 (ug/m3)</t></is></c>
    </row>
    <row r="2">
      <c r="A2" s="1"><v>44927.5</v></c>
      <c r="C2"><v>12.25</v></c>
      <c r="D2" t="b"><v>1</v></c>
    </row>
  </sheetData>
</worksheet>"#;
        let shared = vec!["timestamp_index".to_string()];

        let rows = parse_sheet(xml, &shared)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::Text("timestamp_index".to_string()));
        assert_eq!(rows[0][1], CellValue::Text("PM2.5 (ug/m3)".to_string()));
        assert_eq!(rows[1][0], CellValue::Number(44927.5));
        assert_eq!(rows[1][1], CellValue::Empty);
        assert_eq!(rows[1][2], CellValue::Number(12.25));
        assert_eq!(rows[1][3], CellValue::Bool(true));

        Ok(())
    }

    #[test]
    fn test_parse_shared_strings_concatenates_runs() -> Result<()> {
        let xml = r#"<sst><si><t>plain</t></si><si><r><t>rich </t></r><r><t>text &amp; more</t></r></si></sst>"#;
        let strings = parse_shared_strings(xml)?;
        assert_eq!(strings, vec!["plain".to_string(), "rich text & more".to_string()]);
        Ok(())
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(CellValue::Text(" 4.5 ".to_string()).as_number(), Some(4.5));
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert!(CellValue::Text("2023-06-15 01:00:00".to_string())
            .as_timestamp()
            .is_some());
        assert!(CellValue::Empty.as_timestamp().is_none());
    }

    #[test]
    fn test_not_a_workbook() {
        let err = XlsxReader::new()
            .read_bytes(b"timestamp_index,PM2.5 (ug/m3)\n", District::Kandy, "inline")
            .unwrap_err();
        assert!(matches!(err, PortalError::Zip(_)));
    }
}
