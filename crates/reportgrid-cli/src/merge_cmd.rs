use std::path::{Path, PathBuf};

use reportgrid::run_merge;

use crate::shared::{read_blobs, report_error, write_output};

pub fn run(files: &[PathBuf], output: &Path) -> Result<(), i32> {
    let blobs = read_blobs(files)?;
    let filename = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let delivery = match run_merge(&blobs, &filename) {
        Ok(delivery) => delivery,
        Err(e) => return report_error(e),
    };
    write_output(output, &delivery.bytes)?;
    eprintln!("Merged {} workbooks into {}", blobs.len(), output.display());
    Ok(())
}
