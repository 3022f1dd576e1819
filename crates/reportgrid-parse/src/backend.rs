//! PDF parsing backend trait.
//!
//! Defines the [`PdfBackend`] trait that abstracts PDF parsing operations
//! so the extraction layer does not depend on a specific parser. The
//! default implementation is [`crate::LopdfBackend`].

use reportgrid_core::{ExtractOptions, ExtractResult, ReportError};

use crate::handler::ContentHandler;
use crate::page_objects::{PageCollector, PageContent, PageFrame};

/// Trait abstracting PDF parsing operations.
pub trait PdfBackend {
    /// The parsed PDF document type.
    type Document;

    /// The error type returned by backend operations.
    type Error: std::error::Error + Into<ReportError>;

    /// Parse PDF bytes into a document.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    fn page_count(doc: &Self::Document) -> usize;

    /// Page geometry for the 0-based page `index`.
    fn page_frame(doc: &Self::Document, index: usize) -> Result<PageFrame, Self::Error>;

    /// Run the page content stream through `handler`.
    fn interpret_page(
        doc: &Self::Document,
        index: usize,
        handler: &mut dyn ContentHandler,
        options: &ExtractOptions,
    ) -> Result<(), Self::Error>;

    /// Interpret a page and collect its chars, lines and rects.
    fn extract_page(
        doc: &Self::Document,
        index: usize,
        options: &ExtractOptions,
    ) -> Result<ExtractResult<PageContent>, Self::Error> {
        let mut collector = PageCollector::new(Self::page_frame(doc, index)?);
        Self::interpret_page(doc, index, &mut collector, options)?;
        let (content, mut warnings) = collector.finish();
        for warning in &mut warnings {
            warning.page.get_or_insert(index);
        }
        Ok(ExtractResult::with_warnings(content, warnings))
    }
}
