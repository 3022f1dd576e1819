//! Workbook reader backed by calamine.
//!
//! Accepts any format calamine detects (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`,
//! `.ods`). Cell positions are preserved: a sheet whose data starts at `C3`
//! is read with two leading empty rows and columns.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use reportgrid_core::{CellValue, ReportError, Sheet, Workbook};

/// Convert a calamine cell into a cell value.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn range_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut values = vec![CellValue::Empty; start_col as usize];
        values.extend(row.iter().map(cell_value));
        while values.last().is_some_and(CellValue::is_empty) {
            values.pop();
        }
        rows.push(values);
    }
    rows
}

/// Read every sheet of a workbook held in memory.
pub fn read_workbook(bytes: &[u8]) -> Result<Workbook, ReportError> {
    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ReportError::Document(format!("failed to open workbook: {e}")))?;
    let mut workbook = Workbook::new();
    for name in source.sheet_names() {
        let range = source
            .worksheet_range(&name)
            .map_err(|e| ReportError::Document(format!("failed to read sheet {name}: {e}")))?;
        workbook.add_sheet(Sheet::with_rows(name, range_rows(&range)))?;
    }
    Ok(workbook)
}

/// Read every sheet of a workbook file.
pub fn read_workbook_file(path: impl AsRef<Path>) -> Result<Workbook, ReportError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| ReportError::Document(format!("{}: {e}", path.display())))?;
    read_workbook(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::write_workbook;

    #[test]
    fn cell_value_conversions() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_value(&Data::Int(42)), CellValue::Number(42.0));
        assert_eq!(cell_value(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(cell_value(&Data::Bool(false)), CellValue::Bool(false));
        assert_eq!(cell_value(&Data::String("員工".into())), CellValue::from("員工"));
    }

    #[test]
    fn garbage_is_a_document_error() {
        let err = read_workbook(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, ReportError::Document(_)));
    }

    #[test]
    fn written_workbook_reads_back() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::with_rows(
            "Page_1_Table_1",
            vec![
                vec!["Year".into(), "2020".into()],
                vec!["Staff".into(), CellValue::Number(15.0)],
            ],
        ))
        .unwrap();
        wb.add_sheet(Sheet::with_rows("Other", vec![vec![CellValue::Bool(true)]]))
            .unwrap();
        let bytes = write_workbook(&wb).unwrap().into_inner();

        let back = read_workbook(&bytes).unwrap();
        assert_eq!(back.sheet_names(), vec!["Page_1_Table_1", "Other"]);
        let sheet = back.sheet("Page_1_Table_1").unwrap();
        assert_eq!(sheet.rows[0], vec![CellValue::from("Year"), CellValue::from("2020")]);
        assert_eq!(sheet.rows[1][1], CellValue::Number(15.0));
        assert_eq!(back.sheet("Other").unwrap().rows[0][0], CellValue::Bool(true));
    }

    #[test]
    fn offset_data_keeps_positions() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::with_rows(
            "S",
            vec![vec![], vec![CellValue::Empty, CellValue::Empty, "x".into()]],
        ))
        .unwrap();
        let bytes = write_workbook(&wb).unwrap().into_inner();
        let back = read_workbook(&bytes).unwrap();
        let sheet = back.sheet("S").unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert!(sheet.rows[0].is_empty());
        assert_eq!(sheet.cell(1, 2), Some(&CellValue::from("x")));
    }
}
