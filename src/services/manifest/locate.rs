use crate::services::archive::ArchiveEntry;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MANIFEST_FILE_NAME: &str = "imsmanifest.xml";

/// Pick the manifest entry of an archive: case-insensitive name match at any
/// depth, shallowest first, ties broken by archive order.
pub fn find_manifest_entry(entries: &[ArchiveEntry]) -> Option<&ArchiveEntry> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_dir && e.file_name_lower() == MANIFEST_FILE_NAME)
        .min_by_key(|(index, e)| (e.depth(), *index))
        .map(|(_, e)| e)
}

/// Same rule as [`find_manifest_entry`] for an extracted tree.
pub fn find_manifest_in_tree(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().to_lowercase() == MANIFEST_FILE_NAME)
        .enumerate()
        .min_by_key(|(index, e)| (e.depth(), *index))
        .map(|(_, e)| e.into_path())
}
