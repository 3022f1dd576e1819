use std::path::{Path, PathBuf};

use reportgrid::{ExtractionJob, PageOffset, PageTextScanner, StderrNotifier, TableExtractor};

use crate::cli::Tolerances;
use crate::shared::{build_settings, read_blobs, report_error, write_output};

pub fn run(
    files: &[PathBuf],
    keyword: &str,
    output: &Path,
    tolerances: &Tolerances,
) -> Result<(), i32> {
    let blobs = read_blobs(files)?;
    let offset = PageOffset::default();
    let job = ExtractionJob {
        scanner: PageTextScanner::new(offset),
        extractor: TableExtractor::new(offset, build_settings(tolerances)),
        ..ExtractionJob::default()
    };

    let filename = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let result = match job.run(&blobs, keyword, &filename, &mut StderrNotifier) {
        Ok(result) => result,
        Err(e) => return report_error(e),
    };
    for warning in &result.warnings {
        eprintln!("Warning: {warning}");
    }

    write_output(output, &result.value.bytes)?;
    eprintln!("Wrote {}", output.display());
    Ok(())
}
