use std::path::PathBuf;

use reportgrid::{ReportError, find_keyword_pages};

use crate::cli::OutputFormat;
use crate::shared::{open_pdf, report_error};

pub fn run(files: &[PathBuf], keyword: &str, format: &OutputFormat) -> Result<(), i32> {
    if keyword.is_empty() {
        return report_error(ReportError::EmptyInput("keyword"));
    }

    let mut results = Vec::new();
    for file in files {
        // Failures were already printed; move on to the next document.
        let Ok(pdf) = open_pdf(file) else {
            continue;
        };
        let scan = find_keyword_pages(&pdf, keyword);
        for warning in &scan.warnings {
            eprintln!("Warning: {warning}");
        }
        results.push((file, scan.value));
    }
    if results.is_empty() {
        return Err(1);
    }

    match format {
        OutputFormat::Text => {
            for (file, pages) in &results {
                let list: Vec<String> = pages.iter().map(u32::to_string).collect();
                println!("{}: {}", file.display(), list.join(","));
            }
        }
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = results
                .iter()
                .map(|(file, pages)| {
                    serde_json::json!({
                        "file": file.display().to_string(),
                        "keyword": keyword,
                        "pages": pages,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json).map_err(|e| {
                    eprintln!("Error: JSON serialization failed: {e}");
                    1
                })?
            );
        }
    }
    Ok(())
}
