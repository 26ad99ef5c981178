use serde::{Deserialize, Serialize};

/// One entry of a zip archive, in archive order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Entry name with forward slashes, as stored in the archive.
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

impl ArchiveEntry {
    /// Lowercased final path component.
    pub fn file_name_lower(&self) -> String {
        self.name
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Number of directory components above the entry.
    pub fn depth(&self) -> usize {
        self.name.trim_end_matches('/').matches('/').count()
    }
}
