use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::models::TemporalRecord;
use crate::utils::constants::{EXPORT_COLUMNS, SHEET_NAME};
use crate::utils::timestamp::to_excel_serial;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// Indices into cellXfs in styles.xml
const STYLE_DATETIME: u32 = 1;
const STYLE_HEADER: u32 = 2;

const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd hh:mm:ss"/></numFmts><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Writes records as a single-sheet Office Open XML workbook
pub struct XlsxExporter {
    sheet_name: String,
}

impl XlsxExporter {
    pub fn new() -> Self {
        Self {
            sheet_name: SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: &str) -> Self {
        self.sheet_name = sheet_name.to_string();
        self
    }

    pub fn write_records(&self, records: &[TemporalRecord]) -> Result<Vec<u8>> {
        let workbook = format!(
            r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            XML_DECL,
            NS_MAIN,
            NS_REL,
            escape(self.sheet_name.as_str())
        );
        let sheet = self.sheet_xml(records);

        let parts = [
            ("[Content_Types].xml", format!("{}{}", XML_DECL, CONTENT_TYPES)),
            ("_rels/.rels", format!("{}{}", XML_DECL, ROOT_RELS)),
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", format!("{}{}", XML_DECL, WORKBOOK_RELS)),
            ("xl/styles.xml", format!("{}{}", XML_DECL, STYLES)),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, body) in parts {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    fn sheet_xml(&self, records: &[TemporalRecord]) -> String {
        let mut xml = String::with_capacity(128 * (records.len() + 1));
        xml.push_str(XML_DECL);
        xml.push_str(&format!(r#"<worksheet xmlns="{}">"#, NS_MAIN));
        xml.push_str(r#"<cols><col min="1" max="1" width="20" customWidth="1"/></cols>"#);
        xml.push_str("<sheetData>");

        xml.push_str(r#"<row r="1">"#);
        for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
            xml.push_str(&format!(
                r#"<c r="{}1" t="inlineStr" s="{}"><is><t>{}</t></is></c>"#,
                column_letter(col),
                STYLE_HEADER,
                escape(*name)
            ));
        }
        xml.push_str("</row>");

        for (i, record) in records.iter().enumerate() {
            let row = i + 2;
            xml.push_str(&format!(r#"<row r="{}">"#, row));
            xml.push_str(&format!(
                r#"<c r="A{}" s="{}"><v>{}</v></c>"#,
                row,
                STYLE_DATETIME,
                to_excel_serial(record.timestamp)
            ));

            let numbers = [
                Some(record.pm25_concentration),
                record.temperature,
                record.relative_humidity,
                Some(record.hour as f64),
                Some(record.day as f64),
                Some(record.day_of_week as f64),
                Some(record.month as f64),
            ];
            for (offset, value) in numbers.iter().enumerate() {
                // Absent measurements are left as missing cells
                if let Some(value) = value {
                    xml.push_str(&format!(
                        r#"<c r="{}{}"><v>{}</v></c>"#,
                        column_letter(offset + 1),
                        row,
                        value
                    ));
                }
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-based column index to spreadsheet letters: 0 -> `A`, 27 -> `AB`
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
