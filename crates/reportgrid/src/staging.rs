//! Scoped scratch storage for uploaded files.

use std::path::{Path, PathBuf};

use reportgrid_core::ReportError;
use tempfile::TempDir;

/// A named byte payload, as handed over by a file-upload collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file into a blob named after its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ReportError::Document(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// File stem of the blob name (`report.xlsx` → `report`).
    pub fn stem(&self) -> &str {
        let base = base_name(&self.name);
        match base.rfind('.') {
            Some(0) | None => base,
            Some(dot) => &base[..dot],
        }
    }
}

/// The last path component of `name`, accepting both separators.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Name safe to create inside the staging directory.
fn sanitize(name: &str) -> String {
    let base = base_name(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() || c == ':' { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "upload".to_string(),
        _ => cleaned,
    }
}

/// Temporary directory holding staged blobs, removed on drop.
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    pub fn new() -> Result<Self, ReportError> {
        let dir = tempfile::Builder::new()
            .prefix("reportgrid-")
            .tempdir()
            .map_err(|e| ReportError::Write(format!("failed to create staging directory: {e}")))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `blob` into the staging directory and return its path.
    pub fn stage(&self, blob: &NamedBlob) -> Result<PathBuf, ReportError> {
        let path = self.dir.path().join(sanitize(&blob.name));
        std::fs::write(&path, &blob.bytes)
            .map_err(|e| ReportError::Write(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}
