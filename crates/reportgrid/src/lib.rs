//! reportgrid: Pull bordered tables out of PDF reports into `.xlsx`
//! workbooks, then filter and merge those workbooks.
//!
//! This is the public API facade crate. It re-exports types from
//! reportgrid-core and uses reportgrid-parse for PDF reading and
//! interpretation.
//!
//! # Architecture
//!
//! - **reportgrid-core**: Backend-independent data types and algorithms
//! - **reportgrid-parse**: PDF parsing and content stream interpretation
//! - **reportgrid** (this crate): Pipeline stages, workbook I/O and batch jobs
//!
//! # Example
//!
//! ```ignore
//! use reportgrid::{Pdf, find_keyword_pages, extract_tables, build_workbook, TracingNotifier};
//!
//! let pdf = Pdf::open_file("annual_report.pdf", None)?;
//! let pages = find_keyword_pages(&pdf, "從業員工").value;
//! let tables = extract_tables(&pdf, &pages).value;
//! let xlsx = build_workbook(&tables, &mut TracingNotifier)?;
//! ```

mod builder;
mod extractor;
mod filter;
mod job;
mod merge;
mod notify;
mod page;
mod pdf;
mod scanner;
mod staging;
pub mod xlsx;

pub use builder::{build_workbook, table_sheet_name, table_to_rows, tables_to_workbook};
pub use extractor::{PageTables, TableExtractor, TableRows, extract_tables};
pub use filter::{filter_sheets, filter_workbook_bytes};
pub use job::{Delivery, ExtractionJob, run_filter, run_merge};
pub use merge::{combine_and_deduplicate, combine_files};
pub use notify::{CollectingNotifier, Notifier, StderrNotifier, TracingNotifier};
pub use page::Page;
pub use pdf::Pdf;
pub use scanner::{PageTextScanner, find_keyword_pages};
pub use staging::{NamedBlob, Staging};
pub use xlsx::XLSX_MIME;

pub use reportgrid_core;
pub use reportgrid_core::{
    CellValue, DENYLIST_MARKERS, ExtractOptions, ExtractResult, ExtractWarning,
    ExtractWarningCode, FILTERED_SUFFIX, MERGED_SHEET_NAME, PREAMBLE_PAGES, PageOffset,
    ReportError, Sheet, TableSettings, TextOptions, Workbook, split_keywords,
};
pub use reportgrid_parse;
