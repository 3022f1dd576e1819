//! In-memory workbook model.
//!
//! A [`Workbook`] is an ordered list of uniquely named [`Sheet`]s. Sheets
//! hold absolute cell positions: `rows[0][0]` is `A1`.

use std::fmt;

use crate::error::ReportError;

/// Longest sheet name a spreadsheet application accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A single cell value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Text)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// A named grid of cells.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    /// Iterate over the non-empty cells as `(row, col, value)`.
    pub fn non_empty_cells(&self) -> impl Iterator<Item = (usize, usize, &CellValue)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(move |(c, v)| (r, c, v))
        })
    }

    pub fn is_blank(&self) -> bool {
        self.non_empty_cells().next().is_none()
    }

    /// Write the non-empty cells of `rows` over this sheet, growing it as
    /// needed. Cells that `rows` leaves empty keep their current value.
    pub fn overlay(&mut self, rows: Vec<Vec<CellValue>>) {
        for (r, row) in rows.into_iter().enumerate() {
            if self.rows.len() <= r {
                self.rows.resize_with(r + 1, Vec::new);
            }
            let target = &mut self.rows[r];
            for (c, value) in row.into_iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                if target.len() <= c {
                    target.resize(c + 1, CellValue::Empty);
                }
                target[c] = value;
            }
        }
    }
}

/// Check a sheet name against the spreadsheet naming rules.
pub fn validate_sheet_name(name: &str) -> Result<(), ReportError> {
    if name.is_empty() {
        return Err(ReportError::Write("sheet name is empty".to_string()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(ReportError::Write(format!(
            "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        return Err(ReportError::Write(format!(
            "sheet name '{name}' contains forbidden character '{c}'"
        )));
    }
    Ok(())
}

/// An ordered collection of uniquely named sheets.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet.
    ///
    /// Fails with [`ReportError::Write`] if the name is invalid or already
    /// taken (names compare case-insensitively, as spreadsheet applications
    /// do).
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<(), ReportError> {
        validate_sheet_name(&sheet.name)?;
        let lower = sheet.name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == lower) {
            return Err(ReportError::Write(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// Keep only the sheets for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Sheet) -> bool) {
        self.sheets.retain(keep);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Look up a sheet for writing. Names compare case-insensitively.
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        let lower = name.to_lowercase();
        self.sheets
            .iter_mut()
            .find(|s| s.name.to_lowercase() == lower)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets
    }
}
