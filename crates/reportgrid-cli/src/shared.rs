use std::path::Path;

use reportgrid::{NamedBlob, Pdf, ReportError, TableSettings};

use crate::cli::Tolerances;

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not found
/// or cannot be parsed as a valid PDF.
pub fn open_pdf(file: &Path) -> Result<Pdf, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Pdf::open_file(file, None).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Read every input file into a named blob.
pub fn read_blobs(files: &[impl AsRef<Path>]) -> Result<Vec<NamedBlob>, i32> {
    files
        .iter()
        .map(|file| {
            let file = file.as_ref();
            if !file.exists() {
                eprintln!("Error: file not found: {}", file.display());
                return Err(1);
            }
            NamedBlob::from_path(file).map_err(|e| {
                eprintln!("Error: {e}");
                1
            })
        })
        .collect()
}

/// Map a fatal error to an exit code. Missing input is a no-op, not a
/// failure.
pub fn report_error(err: ReportError) -> Result<(), i32> {
    if err.is_empty_input() {
        eprintln!("Nothing to do: {err}");
        return Ok(());
    }
    eprintln!("Error: {err}");
    Err(1)
}

pub fn build_settings(tolerances: &Tolerances) -> TableSettings {
    let Tolerances {
        snap_tolerance,
        join_tolerance,
        text_tolerance,
    } = *tolerances;
    TableSettings {
        snap_x_tolerance: snap_tolerance,
        snap_y_tolerance: snap_tolerance,
        join_x_tolerance: join_tolerance,
        join_y_tolerance: join_tolerance,
        text_x_tolerance: text_tolerance,
        text_y_tolerance: text_tolerance,
        ..TableSettings::default()
    }
}

/// Write bytes to `path`, reporting failures on stderr.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), i32> {
    std::fs::write(path, bytes).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", path.display());
        1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_not_a_failure() {
        assert_eq!(report_error(ReportError::EmptyInput("keyword")), Ok(()));
        assert_eq!(report_error(ReportError::Write("disk full".into())), Err(1));
    }

    #[test]
    fn tolerances_fill_both_axes() {
        let settings = build_settings(&Tolerances {
            snap_tolerance: 1.0,
            join_tolerance: 2.0,
            text_tolerance: 4.0,
        });
        assert_eq!(settings.snap_x_tolerance, 1.0);
        assert_eq!(settings.snap_y_tolerance, 1.0);
        assert_eq!(settings.join_y_tolerance, 2.0);
        assert_eq!(settings.text_y_tolerance, 4.0);
        assert_eq!(settings.edge_min_length, 3.0);
    }

    #[test]
    fn missing_file_is_exit_code_one() {
        assert_eq!(read_blobs(&["/definitely/not/here.pdf"]).unwrap_err(), 1);
    }
}
