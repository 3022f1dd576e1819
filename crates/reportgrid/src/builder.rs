//! Workbook construction from extracted tables.

use std::io::Cursor;

use reportgrid_core::{CellValue, ReportError, Sheet, Workbook, transpose};
use tracing::debug;

use crate::extractor::{PageTables, TableRows};
use crate::notify::Notifier;
use crate::xlsx::write_workbook;

/// Name of the sheet holding table `index` (0-based) of `page_number`.
pub fn table_sheet_name(page_number: u32, index: usize) -> String {
    format!("Page_{page_number}_Table_{}", index + 1)
}

/// A table transposed into sheet rows: each original row becomes a column,
/// so the header row ends up as the first column.
pub fn table_to_rows(table: &TableRows) -> Vec<Vec<CellValue>> {
    transpose(table)
        .into_iter()
        .map(|row| row.into_iter().map(CellValue::from).collect())
        .collect()
}

fn build(
    page_tables: &[PageTables],
    mut on_sheet: impl FnMut(u32, usize, &str),
) -> Result<Workbook, ReportError> {
    let mut workbook = Workbook::new();
    for page in page_tables {
        for (i, table) in page.tables.iter().enumerate() {
            let name = table_sheet_name(page.page_number, i);
            let rows = table_to_rows(table);
            match workbook.sheet_mut(&name) {
                Some(sheet) => {
                    debug!(sheet = name.as_str(), "overlaying table on existing sheet");
                    sheet.overlay(rows);
                }
                None => workbook.add_sheet(Sheet::with_rows(name.clone(), rows))?,
            }
            on_sheet(page.page_number, i, &name);
        }
    }
    Ok(workbook)
}

/// One sheet per (page, table) pair, in input order.
///
/// A table whose sheet name is already taken (the same page of another
/// document) is written over that sheet: its non-empty cells replace the
/// earlier ones and the rest of the earlier table stays.
pub fn tables_to_workbook(page_tables: &[PageTables]) -> Result<Workbook, ReportError> {
    build(page_tables, |_, _, _| {})
}

/// Build the workbook and serialize it as `.xlsx`, positioned at 0.
///
/// Sends one notice per sheet written.
pub fn build_workbook(
    page_tables: &[PageTables],
    notifier: &mut dyn Notifier,
) -> Result<Cursor<Vec<u8>>, ReportError> {
    let workbook = build(page_tables, |page, i, name| {
        notifier.notice(&format!("page {page} table {}: wrote sheet {name}", i + 1));
    })?;
    write_workbook(&workbook)
}
