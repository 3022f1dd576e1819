//! Combining sheets into one deduplicated table.
//!
//! Each sheet contributes a [`Dataset`]: its first non-blank row is the
//! header, the following non-blank rows are data. Datasets are stacked
//! with columns aligned by label, then cleaned.

use std::collections::HashSet;

use crate::workbook::{CellValue, Sheet};

/// Rows containing any of these markers in any cell are dropped.
pub const DENYLIST_MARKERS: [&str; 2] = ["截至", "月底"];

/// Labels containing this marker are rendered as an empty header cell.
pub const UNNAMED_MARKER: &str = "Unnamed";

/// Name of the single sheet written by a merge.
pub const MERGED_SHEET_NAME: &str = "Sheet1";

/// A labelled table of cell values.
///
/// `labels` align columns across datasets; `header` holds the cell written
/// for each label, keeping numeric headers numeric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub labels: Vec<String>,
    pub header: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

/// Header labels for a raw header row padded to `width` columns.
///
/// Empty header cells become `Unnamed: {i}`; repeated labels get `.1`,
/// `.2`, ... appended.
pub fn header_labels(header: &[CellValue], width: usize) -> Vec<String> {
    let mut labels: Vec<String> = Vec::with_capacity(width);
    for i in 0..width {
        let base = match header.get(i) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => format!("{UNNAMED_MARKER}: {i}"),
        };
        let mut label = base.clone();
        let mut n = 1;
        while labels.contains(&label) {
            label = format!("{base}.{n}");
            n += 1;
        }
        labels.push(label);
    }
    labels
}

/// The cell written for each label: the original header cell when the
/// label is its plain rendering, the label text otherwise.
fn header_cells(header: &[CellValue], labels: &[String]) -> Vec<CellValue> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| match header.get(i) {
            Some(v) if !v.is_empty() && v.to_string() == *label => v.clone(),
            _ => CellValue::Text(label.clone()),
        })
        .collect()
}

impl Dataset {
    /// A dataset whose header cells are the label texts.
    pub fn with_labels(labels: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let header = labels.iter().cloned().map(CellValue::Text).collect();
        Self {
            labels,
            header,
            rows,
        }
    }

    /// Read a sheet as header + data rows. A sheet without any non-blank
    /// row yields an empty dataset.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut rows = sheet.rows.iter().filter(|r| !is_blank_row(r));
        let Some(header) = rows.next() else {
            return Self::default();
        };
        let width = sheet.width();
        let labels = header_labels(header, width);
        let header = header_cells(header, &labels);
        let rows = rows
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            labels,
            header,
            rows,
        }
    }

    /// Stack datasets, aligning columns by label.
    ///
    /// The result's labels are the union of all labels in first-seen order;
    /// columns a dataset lacks are filled with empty cells.
    pub fn concat(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let mut out = Self::default();
        for ds in datasets {
            let positions: Vec<usize> = ds
                .labels
                .iter()
                .zip(&ds.header)
                .map(|(label, cell)| match out.labels.iter().position(|l| l == label) {
                    Some(p) => p,
                    None => {
                        out.labels.push(label.clone());
                        out.header.push(cell.clone());
                        out.labels.len() - 1
                    }
                })
                .collect();
            for row in &mut out.rows {
                row.resize(out.labels.len(), CellValue::Empty);
            }
            for row in ds.rows {
                let mut aligned = vec![CellValue::Empty; out.labels.len()];
                for (value, &pos) in row.into_iter().zip(&positions) {
                    aligned[pos] = value;
                }
                out.rows.push(aligned);
            }
        }
        out
    }

    /// Drop every row in which any cell's string form contains a marker.
    pub fn drop_rows_containing(&mut self, markers: &[&str]) {
        self.rows.retain(|row| {
            !row.iter()
                .filter(|v| !v.is_empty())
                .any(|v| {
                    let text = v.to_string();
                    markers.iter().any(|m| text.contains(*m))
                })
        });
    }

    /// Drop exact duplicate rows, keeping the first occurrence.
    pub fn dedup_rows(&mut self) {
        let mut seen: HashSet<Vec<CellKey>> = HashSet::new();
        self.rows
            .retain(|row| seen.insert(row.iter().map(CellKey::from).collect()));
    }

    /// Blank out every label containing [`UNNAMED_MARKER`].
    pub fn clear_unnamed_labels(&mut self) {
        for (label, cell) in self.labels.iter_mut().zip(&mut self.header) {
            if label.contains(UNNAMED_MARKER) {
                label.clear();
                *cell = CellValue::Empty;
            }
        }
    }

    /// Render as a sheet: one header row followed by the data rows.
    pub fn to_sheet(&self, name: &str) -> Sheet {
        let mut sheet = Sheet::new(name);
        sheet.push_row(self.header.clone());
        sheet.rows.extend(self.rows.iter().cloned());
        sheet
    }
}

/// Hashable identity of a cell value, numbers compared by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey {
    Empty,
    Text(String),
    Number(u64),
    Bool(bool),
}

impl From<&CellValue> for CellKey {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => CellKey::Empty,
            CellValue::Text(s) if s.is_empty() => CellKey::Empty,
            CellValue::Text(s) => CellKey::Text(s.clone()),
            CellValue::Number(n) if *n == 0.0 => CellKey::Number(0),
            CellValue::Number(n) => CellKey::Number(n.to_bits()),
            CellValue::Bool(b) => CellKey::Bool(*b),
        }
    }
}

/// Run the full merge over a sequence of sheets: load, stack, drop
/// denylisted rows, drop duplicates, blank unnamed labels.
pub fn combine_sheets<'a>(sheets: impl IntoIterator<Item = &'a Sheet>) -> Dataset {
    let mut combined = Dataset::concat(sheets.into_iter().map(Dataset::from_sheet));
    combined.drop_rows_containing(&DENYLIST_MARKERS);
    combined.dedup_rows();
    combined.clear_unnamed_labels();
    combined
}
