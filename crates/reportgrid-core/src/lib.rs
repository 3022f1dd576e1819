//! reportgrid-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types (BBox, Char, Edge, Table,
//! Workbook, ...) and algorithms (text grouping, lattice table detection,
//! page numbering, sheet filtering, dataset merging) used by reportgrid.
//! It does no I/O.

pub mod dataset;
pub mod edges;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod grid;
pub mod pages;
pub mod table;
pub mod text;
pub mod workbook;

pub use dataset::{DENYLIST_MARKERS, Dataset, MERGED_SHEET_NAME, UNNAMED_MARKER, combine_sheets};
pub use edges::{Edge, EdgeSource, Line, Rect, derive_edges};
pub use error::{ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, ReportError};
pub use filter::{FILTERED_SUFFIX, filter_workbook, filtered_file_name, sheet_matches, split_keywords};
pub use geometry::{BBox, Matrix, Orientation};
pub use grid::transpose;
pub use pages::{PREAMBLE_PAGES, PageOffset, contains_keyword};
pub use table::{Cell, Table, TableFinder, TableSettings};
pub use text::{Char, TextOptions, chars_to_text};
pub use workbook::{CellValue, Sheet, Workbook};
