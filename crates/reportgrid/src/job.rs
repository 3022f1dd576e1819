//! Batch operations over uploaded blobs.
//!
//! Each operation stages its inputs in a private temporary directory, runs
//! to completion, and hands back the finished workbook bytes together with
//! a download name and MIME type.

use reportgrid_core::{
    ExtractOptions, ExtractResult, ExtractWarning, FILTERED_SUFFIX, ReportError, split_keywords,
};
use tracing::warn;

use crate::builder::build_workbook;
use crate::extractor::{PageTables, TableExtractor};
use crate::filter::filter_sheets;
use crate::merge::combine_and_deduplicate;
use crate::notify::Notifier;
use crate::scanner::PageTextScanner;
use crate::staging::{NamedBlob, Staging};
use crate::xlsx::XLSX_MIME;
use crate::Pdf;

/// A finished workbook ready to hand to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}

impl Delivery {
    pub fn xlsx(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime: XLSX_MIME,
        }
    }
}

/// Keyword scan plus table extraction over a batch of PDFs, producing one
/// combined workbook.
#[derive(Debug, Clone, Default)]
pub struct ExtractionJob {
    pub scanner: PageTextScanner,
    pub extractor: TableExtractor,
    pub options: ExtractOptions,
}

impl ExtractionJob {
    /// Run the pipeline over every document.
    ///
    /// A document that cannot be opened is reported and skipped; the tables
    /// of all other documents land in one workbook, in upload order.
    ///
    /// # Errors
    ///
    /// [`ReportError::EmptyInput`] when `keyword` is empty or no documents
    /// were given, [`ReportError::Write`] when the workbook cannot be built.
    /// Two documents yielding the same sheet name share that sheet, the
    /// later table written over the earlier one.
    pub fn run(
        &self,
        blobs: &[NamedBlob],
        keyword: &str,
        filename: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<ExtractResult<Delivery>, ReportError> {
        if blobs.is_empty() {
            return Err(ReportError::EmptyInput("documents"));
        }
        if keyword.is_empty() {
            return Err(ReportError::EmptyInput("keyword"));
        }

        let staging = Staging::new()?;
        let mut all_tables: Vec<PageTables> = Vec::new();
        let mut warnings = Vec::new();

        for blob in blobs {
            let pdf = match staging
                .stage(blob)
                .and_then(|path| Pdf::open_file(path, Some(self.options.clone())))
            {
                Ok(pdf) => pdf.with_name(blob.name.as_str()),
                Err(e) => {
                    warn!(document = blob.name.as_str(), "skipping document: {e}");
                    notifier.notice(&format!("could not read {}: {e}", blob.name));
                    warnings.push(ExtractWarning::for_document(blob.name.as_str(), e.to_string()));
                    continue;
                }
            };

            let scan = self.scanner.find_keyword_pages(&pdf, keyword);
            notifier.notice(&format!(
                "keyword '{keyword}' appears on pages: {:?} ({})",
                scan.value, blob.name
            ));
            warnings.extend(scan.warnings);

            let extracted = self.extractor.extract_tables(&pdf, &scan.value);
            warnings.extend(extracted.warnings);
            all_tables.extend(extracted.value);
        }

        let bytes = build_workbook(&all_tables, notifier)?.into_inner();
        notifier.notice("tables extracted");
        Ok(ExtractResult::with_warnings(
            Delivery::xlsx(bytes, filename),
            warnings,
        ))
    }
}

/// Filter every workbook by the comma-separated keywords in
/// `keyword_text`, one delivery per input named `{stem}_filtered.xlsx`.
///
/// # Errors
///
/// [`ReportError::EmptyInput`] when `keyword_text` is empty or no workbooks
/// were given. The first unreadable workbook stops the batch.
pub fn run_filter(blobs: &[NamedBlob], keyword_text: &str) -> Result<Vec<Delivery>, ReportError> {
    if blobs.is_empty() {
        return Err(ReportError::EmptyInput("workbooks"));
    }
    if keyword_text.is_empty() {
        return Err(ReportError::EmptyInput("keyword"));
    }
    let keywords = split_keywords(keyword_text);
    let staging = Staging::new()?;

    blobs
        .iter()
        .map(|blob| {
            let staged = staging.stage(blob)?;
            let out = filter_sheets(&staged, &keywords)?;
            let bytes = std::fs::read(&out)
                .map_err(|e| ReportError::Write(format!("{}: {e}", out.display())))?;
            Ok(Delivery::xlsx(
                bytes,
                format!("{}{FILTERED_SUFFIX}.xlsx", blob.stem()),
            ))
        })
        .collect()
}

/// Merge and deduplicate every workbook into one delivery.
///
/// # Errors
///
/// [`ReportError::EmptyInput`] when no workbooks were given; any unreadable
/// workbook fails the merge.
pub fn run_merge(blobs: &[NamedBlob], filename: &str) -> Result<Delivery, ReportError> {
    if blobs.is_empty() {
        return Err(ReportError::EmptyInput("workbooks"));
    }
    let inputs: Vec<&[u8]> = blobs.iter().map(|b| b.bytes.as_slice()).collect();
    let bytes = combine_and_deduplicate(&inputs)?.into_inner();
    Ok(Delivery::xlsx(bytes, filename))
}
