//! On-disk layout of engine-owned state: repaired archives, instrumented
//! archives and player sessions, each under the configured data directory.

use std::fs;
use std::path::{Path, PathBuf};

const REPAIRED_DIR: &str = "repaired";
const INSTRUMENTED_DIR: &str = "instrumented";
const SESSIONS_DIR: &str = "sessions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repaired_dir(&self) -> PathBuf {
        self.root.join(REPAIRED_DIR)
    }

    pub fn instrumented_dir(&self) -> PathBuf {
        self.root.join(INSTRUMENTED_DIR)
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join(SESSIONS_DIR)
    }

    /// Create all storage areas.
    pub fn ensure(&self) -> Result<(), String> {
        for dir in [self.repaired_dir(), self.instrumented_dir(), self.sessions_dir()] {
            fs::create_dir_all(&dir)
                .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        }
        Ok(())
    }
}

/// Output file name derived from a source archive: `course.zip` + `_repaired.zip`
/// gives `course_repaired.zip`. The stem is sanitized for use as a file name.
pub fn derived_archive_name(source: &Path, suffix: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = sanitize_filename::sanitize(stem.trim());
    let stem = if stem.is_empty() {
        "package".to_string()
    } else {
        stem
    };
    format!("{stem}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_archive_name() {
        assert_eq!(
            derived_archive_name(Path::new("/in/course.zip"), "_repaired.zip"),
            "course_repaired.zip"
        );
        assert_eq!(
            derived_archive_name(Path::new("we:ird?.zip"), "_instrumented.zip"),
            "weird_instrumented.zip"
        );
    }

    #[test]
    fn test_ensure_creates_all_areas() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("data"));
        layout.ensure().unwrap();

        assert!(layout.repaired_dir().is_dir());
        assert!(layout.instrumented_dir().is_dir());
        assert!(layout.sessions_dir().is_dir());
    }
}
