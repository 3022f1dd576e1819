//! Top-level PDF document type for opening and extracting content.

use std::path::Path;

use reportgrid_core::{ExtractOptions, ReportError};
use reportgrid_parse::{LopdfBackend, LopdfDocument, PdfBackend};

use crate::Page;

/// A PDF document opened for extraction.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(&bytes, None)?;
/// let page = pdf.page(4)?;
/// let text = page.extract_text(&TextOptions::default());
/// ```
pub struct Pdf {
    doc: LopdfDocument,
    options: ExtractOptions,
    /// Source name used in warnings (file name or blob name).
    name: String,
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("name", &self.name)
            .field("page_count", &self.page_count())
            .finish_non_exhaustive()
    }
}

impl Pdf {
    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Document`] if the bytes are not a readable,
    /// unencrypted PDF.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, ReportError> {
        let doc = LopdfBackend::open(bytes).map_err(ReportError::from)?;
        Ok(Self {
            doc,
            options: options.unwrap_or_default(),
            name: String::from("<memory>"),
        })
    }

    /// Open a PDF document from a file path.
    pub fn open_file(
        path: impl AsRef<Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ReportError::Document(format!("{}: {e}", path.display())))?;
        let mut pdf = Self::open(&bytes, options)
            .map_err(|e| ReportError::Document(format!("{}: {e}", path.display())))?;
        pdf.name = path.display().to_string();
        Ok(pdf)
    }

    /// Set the name reported in warnings.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_count(&self) -> usize {
        LopdfBackend::page_count(&self.doc)
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Interpret the page at 0-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Document`] when the index is out of range or
    /// the page content cannot be decoded.
    pub fn page(&self, index: usize) -> Result<Page, ReportError> {
        let result = LopdfBackend::extract_page(&self.doc, index, &self.options)?;
        let warnings = result
            .warnings
            .into_iter()
            .map(|w| w.set_document(self.name.as_str()))
            .collect();
        Ok(Page::from_content(index, result.value, warnings))
    }
}
