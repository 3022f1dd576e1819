//! `.xlsx` reading and writing.

pub mod reader;
pub mod writer;

pub use reader::{read_workbook, read_workbook_file};
pub use writer::{PackageWriter, write_workbook};

/// MIME type of `.xlsx` workbooks.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
