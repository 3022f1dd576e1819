//! Bordered table extraction from selected pages.

use reportgrid_core::{ExtractResult, ExtractWarning, PageOffset, TableSettings};
use tracing::{debug, warn};

use crate::Pdf;

/// A table as rows of optional cell strings. `None` marks a slot covered by
/// a spanning cell.
pub type TableRows = Vec<Vec<Option<String>>>;

/// The tables found on one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageTables {
    /// Adjusted (1-based, preamble excluded) page number.
    pub page_number: u32,
    /// Tables in page order: top-to-bottom, then left-to-right.
    pub tables: Vec<TableRows>,
}

/// Extracts lattice tables from pages given by adjusted number.
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    pub offset: PageOffset,
    pub settings: TableSettings,
}

impl TableExtractor {
    pub fn new(offset: PageOffset, settings: TableSettings) -> Self {
        Self { offset, settings }
    }

    /// Tables of every listed page, in the order the pages were given.
    ///
    /// Pages without tables are omitted. A page that is out of range or
    /// cannot be interpreted is skipped and reported as a warning.
    pub fn extract_tables(&self, pdf: &Pdf, pages: &[u32]) -> ExtractResult<Vec<PageTables>> {
        let mut out = Vec::new();
        let mut warnings = Vec::new();

        for &page_number in pages {
            let Some(raw) = self.offset.to_raw(page_number) else {
                warn!(document = pdf.name(), "page number 0 is not a counted page");
                warnings.push(
                    ExtractWarning::on_page(format!("page number {page_number} is invalid"), 0)
                        .set_document(pdf.name()),
                );
                continue;
            };
            let page = match pdf.page(raw) {
                Ok(page) => page,
                Err(e) => {
                    warn!(document = pdf.name(), page = page_number, "skipping page: {e}");
                    warnings.push(
                        ExtractWarning::on_page(e.to_string(), raw).set_document(pdf.name()),
                    );
                    continue;
                }
            };
            warnings.extend(page.warnings().iter().cloned());

            let tables = page.extract_tables(&self.settings);
            debug!(
                document = pdf.name(),
                page = page_number,
                count = tables.len(),
                "tables extracted"
            );
            if !tables.is_empty() {
                out.push(PageTables {
                    page_number,
                    tables,
                });
            }
        }
        ExtractResult::with_warnings(out, warnings)
    }
}

/// Extract with the standard preamble and default lattice settings.
pub fn extract_tables(pdf: &Pdf, pages: &[u32]) -> ExtractResult<Vec<PageTables>> {
    TableExtractor::default().extract_tables(pdf, pages)
}
