//! Keyword filtering of workbook sheets.

use std::path::{Path, PathBuf};

use crate::workbook::{Sheet, Workbook};

/// Suffix appended to the file stem of a filtered workbook.
pub const FILTERED_SUFFIX: &str = "_filtered";

/// Split user keyword text on `,`.
///
/// Parts are not trimmed, so `"a, b"` yields `"a"` and `" b"`, and a
/// trailing comma yields an empty keyword.
pub fn split_keywords(text: &str) -> Vec<String> {
    text.split(',').map(str::to_string).collect()
}

/// Whether any non-empty cell of `sheet` contains any keyword.
///
/// Matching is case-sensitive on each cell's string form. An empty keyword
/// matches every non-empty cell.
pub fn sheet_matches<S: AsRef<str>>(sheet: &Sheet, keywords: &[S]) -> bool {
    sheet.non_empty_cells().any(|(_, _, value)| {
        let text = value.to_string();
        keywords.iter().any(|k| text.contains(k.as_ref()))
    })
}

/// Copy the matching sheets of `workbook` into a new workbook, keeping
/// names, order and cell positions.
pub fn filter_workbook<S: AsRef<str>>(workbook: &Workbook, keywords: &[S]) -> Workbook {
    let mut out = workbook.clone();
    out.retain(|sheet| sheet_matches(sheet, keywords));
    out
}

/// `report.xlsx` → `report_filtered.xlsx`, `report` → `report_filtered`.
pub fn filtered_file_name(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{FILTERED_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{FILTERED_SUFFIX}"),
    };
    path.with_file_name(name)
}
