//! Keyword page scanning.

use reportgrid_core::{
    ExtractResult, ExtractWarning, PageOffset, TextOptions, contains_keyword,
};
use tracing::{debug, warn};

use crate::Pdf;

/// Finds the counted pages whose text mentions a keyword.
#[derive(Debug, Clone, Default)]
pub struct PageTextScanner {
    pub offset: PageOffset,
    pub text_options: TextOptions,
}

impl PageTextScanner {
    pub fn new(offset: PageOffset) -> Self {
        Self {
            offset,
            text_options: TextOptions::default(),
        }
    }

    /// Adjusted page numbers (ascending) whose text contains `keyword`,
    /// compared case-insensitively.
    ///
    /// Preamble pages are never read. A page that cannot be interpreted is
    /// treated as having no text and reported as a warning. An empty
    /// keyword yields no pages.
    pub fn find_keyword_pages(&self, pdf: &Pdf, keyword: &str) -> ExtractResult<Vec<u32>> {
        let mut found = Vec::new();
        let mut warnings = Vec::new();
        if keyword.is_empty() {
            return ExtractResult::ok(found);
        }

        for raw in self.offset.counted_pages(pdf.page_count()) {
            let page = match pdf.page(raw) {
                Ok(page) => page,
                Err(e) => {
                    warn!(document = pdf.name(), page = raw, "skipping page: {e}");
                    warnings.push(
                        ExtractWarning::on_page(e.to_string(), raw).set_document(pdf.name()),
                    );
                    continue;
                }
            };
            warnings.extend(page.warnings().iter().cloned());

            let Some(text) = page.extract_text(&self.text_options) else {
                continue;
            };
            if contains_keyword(&text, keyword) {
                if let Some(adjusted) = self.offset.to_adjusted(raw) {
                    debug!(document = pdf.name(), page = adjusted, "keyword found");
                    found.push(adjusted);
                }
            }
        }
        ExtractResult::with_warnings(found, warnings)
    }
}

/// Scan with the standard four-page preamble.
pub fn find_keyword_pages(pdf: &Pdf, keyword: &str) -> ExtractResult<Vec<u32>> {
    PageTextScanner::default().find_keyword_pages(pdf, keyword)
}
