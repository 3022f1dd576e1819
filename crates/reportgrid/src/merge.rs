//! Combining and deduplicating workbooks.

use std::io::Cursor;
use std::path::Path;

use reportgrid_core::{MERGED_SHEET_NAME, ReportError, Workbook, combine_sheets};
use tracing::debug;

use crate::xlsx::{read_workbook, read_workbook_file, write_workbook};

fn merge(workbooks: &[Workbook]) -> Result<Cursor<Vec<u8>>, ReportError> {
    let dataset = combine_sheets(workbooks.iter().flat_map(|wb| wb.sheets()));
    debug!(
        workbooks = workbooks.len(),
        columns = dataset.labels.len(),
        rows = dataset.rows.len(),
        "workbooks combined"
    );
    let mut out = Workbook::new();
    out.add_sheet(dataset.to_sheet(MERGED_SHEET_NAME))?;
    write_workbook(&out)
}

/// Stack every sheet of every workbook into one table, drop rows holding
/// `截至` or `月底`, drop duplicate rows, and blank `Unnamed` column labels.
///
/// The result is a single-sheet `.xlsx` positioned at 0. Any workbook that
/// cannot be read fails the whole merge.
pub fn combine_and_deduplicate<B: AsRef<[u8]>>(
    workbooks: &[B],
) -> Result<Cursor<Vec<u8>>, ReportError> {
    let loaded = workbooks
        .iter()
        .map(|bytes| read_workbook(bytes.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    merge(&loaded)
}

/// [`combine_and_deduplicate`] over workbook files.
pub fn combine_files<P: AsRef<Path>>(paths: &[P]) -> Result<Cursor<Vec<u8>>, ReportError> {
    let loaded = paths
        .iter()
        .map(read_workbook_file)
        .collect::<Result<Vec<_>, _>>()?;
    merge(&loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportgrid_core::{CellValue, Sheet};

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|&c| CellValue::from(c)).collect()
    }

    fn workbook(rows: Vec<Vec<CellValue>>) -> Vec<u8> {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::with_rows("Data", rows)).unwrap();
        write_workbook(&wb).unwrap().into_inner()
    }

    #[test]
    fn denylist_and_duplicates_are_dropped() {
        let first = workbook(vec![
            row(&["Name", "Value"]),
            row(&["A", "1"]),
            row(&["A", "1"]),
            row(&["B", "截至 2020"]),
        ]);
        let second = workbook(vec![row(&["Name", "Value"]), row(&["A", "1"]), row(&["C", "2"])]);

        let cursor = combine_and_deduplicate(&[first, second]).unwrap();
        assert_eq!(cursor.position(), 0);
        let wb = read_workbook(cursor.get_ref()).unwrap();
        assert_eq!(wb.sheet_names(), vec![MERGED_SHEET_NAME]);
        let sheet = wb.sheet(MERGED_SHEET_NAME).unwrap();
        assert_eq!(
            sheet.rows,
            vec![row(&["Name", "Value"]), row(&["A", "1"]), row(&["C", "2"])]
        );
    }

    #[test]
    fn unnamed_header_is_blank_in_output() {
        let book = workbook(vec![
            vec![CellValue::Empty, CellValue::from("Staff")],
            row(&["2020", "15"]),
        ]);
        let cursor = combine_and_deduplicate(&[book]).unwrap();
        let wb = read_workbook(cursor.get_ref()).unwrap();
        let sheet = wb.sheet(MERGED_SHEET_NAME).unwrap();
        assert_eq!(sheet.rows[0], vec![CellValue::Empty, CellValue::from("Staff")]);
        assert_eq!(sheet.rows[1], row(&["2020", "15"]));
    }

    #[test]
    fn columns_align_by_label() {
        let first = workbook(vec![row(&["A", "B"]), row(&["1", "2"])]);
        let second = workbook(vec![row(&["B", "C"]), row(&["3", "4"])]);
        let cursor = combine_and_deduplicate(&[first, second]).unwrap();
        let wb = read_workbook(cursor.get_ref()).unwrap();
        let sheet = wb.sheet(MERGED_SHEET_NAME).unwrap();
        assert_eq!(sheet.rows[0], row(&["A", "B", "C"]));
        assert_eq!(sheet.rows[1], row(&["1", "2"]));
        assert_eq!(sheet.rows[2], vec![CellValue::Empty, "3".into(), "4".into()]);
    }

    #[test]
    fn one_bad_workbook_fails_the_merge() {
        let good = workbook(vec![row(&["A"]), row(&["1"])]);
        let err = combine_and_deduplicate(&[good, b"garbage".to_vec()]).unwrap_err();
        assert!(matches!(err, ReportError::Document(_)));
    }

    #[test]
    fn files_variant_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xlsx");
        std::fs::write(&path, workbook(vec![row(&["K"]), row(&["v"])])).unwrap();
        let cursor = combine_files(&[&path]).unwrap();
        let wb = read_workbook(cursor.get_ref()).unwrap();
        assert_eq!(wb.sheet(MERGED_SHEET_NAME).unwrap().rows.len(), 2);
    }
}
