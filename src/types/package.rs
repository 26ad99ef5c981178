use super::errors::{PackageError, PackageResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A course package archive on disk. Never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub source_path: PathBuf,
    pub size_bytes: u64,
}

impl Package {
    /// Open an existing archive file.
    pub fn open(path: &Path) -> PackageResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            PackageError::MissingArchiveInput(format!("{}: {e}", path.display()))
        })?;

        if !metadata.is_file() {
            return Err(PackageError::MissingArchiveInput(format!(
                "{} is not a file",
                path.display()
            )));
        }

        Ok(Self {
            source_path: path.to_path_buf(),
            size_bytes: metadata.len(),
        })
    }

    /// Open an archive and reject it when it exceeds `max_bytes`.
    pub fn open_with_limit(path: &Path, max_bytes: u64) -> PackageResult<Self> {
        let package = Self::open(path)?;
        if package.size_bytes > max_bytes {
            return Err(PackageError::MissingArchiveInput(format!(
                "{} is {} bytes, limit is {} bytes",
                path.display(),
                package.size_bytes,
                max_bytes
            )));
        }
        Ok(package)
    }

    /// File name of the archive, e.g. `course.zip`.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name without the `.zip` extension.
    pub fn stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "package".to_string())
    }
}
