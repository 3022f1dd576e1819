use std::path::PathBuf;

use reportgrid::{ReportError, filter_sheets, split_keywords};

use crate::shared::report_error;

/// Filter each workbook in place, writing `{stem}_filtered.xlsx` beside it.
pub fn run(files: &[PathBuf], keywords: &str) -> Result<(), i32> {
    if files.is_empty() {
        return report_error(ReportError::EmptyInput("workbooks"));
    }
    if keywords.is_empty() {
        return report_error(ReportError::EmptyInput("keyword"));
    }
    let keywords = split_keywords(keywords);

    for file in files {
        match filter_sheets(file, &keywords) {
            Ok(out) => println!("{}", out.display()),
            Err(e) => return report_error(e),
        }
    }
    eprintln!("Kept only the sheets containing the keywords");
    Ok(())
}
