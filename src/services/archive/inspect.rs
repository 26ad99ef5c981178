use super::types::ArchiveEntry;
use std::fs;
use std::io::Read;
use std::path::Path;

fn open_zip(archive_path: &Path) -> Result<zip::ZipArchive<fs::File>, String> {
    let file = fs::File::open(archive_path).map_err(|e| format!("Failed to open archive: {e}"))?;
    zip::ZipArchive::new(file).map_err(|e| format!("Invalid or corrupt ZIP: {e}"))
}

/// List every entry of a ZIP archive without extracting, in archive order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>, String> {
    let mut archive = open_zip(archive_path)?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read entry {i}: {e}"))?;

        // Normalize path separators written by some Windows authoring tools
        entries.push(ArchiveEntry {
            name: entry.name().replace('\\', "/"),
            size: entry.size(),
            is_dir: entry.is_dir(),
        });
    }

    Ok(entries)
}

/// Read a single entry into memory as (lossy) UTF-8, reading at most `limit` bytes.
///
/// `name` is matched against the normalized entry name returned by [`list_entries`].
pub fn read_entry_to_string(
    archive_path: &Path,
    name: &str,
    limit: u64,
) -> Result<String, String> {
    let mut archive = open_zip(archive_path)?;

    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read entry {i}: {e}"))?;
        if entry.name().replace('\\', "/") != name {
            continue;
        }

        let mut bytes = Vec::new();
        entry
            .take(limit)
            .read_to_end(&mut bytes)
            .map_err(|e| format!("Failed to read entry {name}: {e}"))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    Err(format!("Entry not found in archive: {name}"))
}
