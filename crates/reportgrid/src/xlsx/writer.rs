//! SpreadsheetML package writer.
//!
//! Writes a [`Workbook`] as an `.xlsx` ZIP package. Strings are stored
//! inline in each cell, so the package has no shared string table.

use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use reportgrid_core::{CellValue, ReportError, Sheet, Workbook};
use zip::write::{SimpleFileOptions, ZipWriter};

const CONTENT_TYPES_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Escape XML special characters and drop characters XML 1.0 cannot carry.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

/// Spreadsheet column letters for a 0-based column index (`0` → `A`,
/// `26` → `AA`).
pub fn column_letters(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn write_cell(xml: &mut String, reference: &str, value: &CellValue) {
    // Writing into a String cannot fail.
    let _ = match value {
        CellValue::Empty => Ok(()),
        CellValue::Text(s) if s.is_empty() => Ok(()),
        CellValue::Text(s) => write!(
            xml,
            r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape_xml(s)
        ),
        CellValue::Number(n) if n.is_finite() => write!(xml, r#"<c r="{reference}"><v>{n}</v></c>"#),
        CellValue::Number(n) => write!(
            xml,
            r#"<c r="{reference}" t="inlineStr"><is><t>{n}</t></is></c>"#
        ),
        CellValue::Bool(b) => write!(xml, r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*b)),
    };
}

/// Worksheet XML for one sheet.
pub fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    let _ = write!(xml, r#"<worksheet xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheetData>"#);
    for (r, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        let _ = write!(xml, r#"<row r="{}">"#, r + 1);
        for (c, value) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), r + 1);
            write_cell(&mut xml, &reference, value);
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    let _ = write!(xml, r#"<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#);
    for (i, sheet) in workbook.sheets().iter().enumerate() {
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    );
    xml.push_str("</Relationships>");
    xml
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = String::from(CONTENT_TYPES_HEAD);
    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

/// Builder for an `.xlsx` package in memory.
pub struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add_part(&mut self, path: &str, content: &[u8]) -> Result<(), ReportError> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip
            .start_file(path, options)
            .map_err(|e| ReportError::Write(format!("{path}: {e}")))?;
        self.zip
            .write_all(content)
            .map_err(|e| ReportError::Write(format!("{path}: {e}")))
    }

    /// Write every part of `workbook` and return the finished package,
    /// positioned at 0.
    pub fn write(mut self, workbook: &Workbook) -> Result<Cursor<Vec<u8>>, ReportError> {
        let count = workbook.len();
        self.add_part("[Content_Types].xml", content_types(count).as_bytes())?;
        self.add_part("_rels/.rels", ROOT_RELS.as_bytes())?;
        self.add_part("xl/workbook.xml", workbook_xml(workbook).as_bytes())?;
        self.add_part("xl/_rels/workbook.xml.rels", workbook_rels(count).as_bytes())?;
        self.add_part("xl/styles.xml", STYLES.as_bytes())?;
        for (i, sheet) in workbook.sheets().iter().enumerate() {
            let path = format!("xl/worksheets/sheet{}.xml", i + 1);
            self.add_part(&path, sheet_xml(sheet).as_bytes())?;
        }
        let mut cursor = self
            .zip
            .finish()
            .map_err(|e| ReportError::Write(format!("failed to finish workbook: {e}")))?;
        cursor.set_position(0);
        Ok(cursor)
    }
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a workbook to `.xlsx` bytes.
pub fn write_workbook(workbook: &Workbook) -> Result<Cursor<Vec<u8>>, ReportError> {
    PackageWriter::new().write(workbook)
}
