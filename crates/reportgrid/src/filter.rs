//! Keyword filtering of workbook files.

use std::path::{Path, PathBuf};

use reportgrid_core::{ReportError, filter_workbook, filtered_file_name};
use tracing::debug;

use crate::xlsx::{read_workbook, read_workbook_file, write_workbook};

/// Keep only the sheets of the workbook at `path` that contain any keyword,
/// and write them next to it as `{stem}_filtered.{ext}`.
///
/// Returns the path written.
///
/// # Errors
///
/// [`ReportError::Document`] when the source cannot be read,
/// [`ReportError::Write`] when the result cannot be written.
pub fn filter_sheets<S: AsRef<str>>(path: &Path, keywords: &[S]) -> Result<PathBuf, ReportError> {
    let workbook = read_workbook_file(path)?;
    let filtered = filter_workbook(&workbook, keywords);
    debug!(
        source = %path.display(),
        kept = filtered.len(),
        total = workbook.len(),
        "sheets filtered"
    );
    let out = filtered_file_name(path);
    let bytes = write_workbook(&filtered)?.into_inner();
    std::fs::write(&out, bytes)
        .map_err(|e| ReportError::Write(format!("{}: {e}", out.display())))?;
    Ok(out)
}

/// Filter a workbook held in memory, returning the filtered `.xlsx` bytes.
pub fn filter_workbook_bytes<S: AsRef<str>>(
    bytes: &[u8],
    keywords: &[S],
) -> Result<Vec<u8>, ReportError> {
    let workbook = read_workbook(bytes)?;
    let filtered = filter_workbook(&workbook, keywords);
    Ok(write_workbook(&filtered)?.into_inner())
}
