use std::fs;
use std::io::{self, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

/// Repack a directory tree into a new ZIP archive at `dest_zip`.
///
/// Entry names are relative to `source_dir` with forward slashes and sorted
/// for reproducible output. Directories are stored as entries so empty ones
/// survive. The archive is written to a temporary sibling and moved into
/// place only once complete, so a failure never leaves a partial file at
/// `dest_zip`. Returns the number of files written.
pub fn pack_directory(source_dir: &Path, dest_zip: &Path) -> Result<usize, String> {
    if !source_dir.is_dir() {
        return Err(format!(
            "ZIP source must be a directory (got {})",
            source_dir.display()
        ));
    }

    let parent = match dest_zip.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().map_err(|e| format!("Failed to resolve cwd: {e}"))?,
    };
    fs::create_dir_all(&parent).map_err(|e| format!("Failed to create output dir: {e}"))?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).follow_links(false) {
        let entry = entry.map_err(|e| format!("Failed to walk {}: {e}", source_dir.display()))?;
        let path = entry.path();
        if path == source_dir {
            continue;
        }

        let relative = path
            .strip_prefix(source_dir)
            .map_err(|e| format!("Failed to relativize {}: {e}", path.display()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            dirs.push(format!("{name}/"));
        } else if entry.file_type().is_file() {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();

    let staging = tempfile::NamedTempFile::new_in(&parent)
        .map_err(|e| format!("Failed to create staging archive: {e}"))?;

    let mut writer = zip::ZipWriter::new(staging);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for dir in &dirs {
        writer
            .add_directory(dir.as_str(), options)
            .map_err(|e| format!("Failed to add directory {dir}: {e}"))?;
    }

    for name in &files {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| format!("Failed to add file {name}: {e}"))?;
        let mut input = fs::File::open(source_dir.join(name))
            .map_err(|e| format!("Failed to open {name}: {e}"))?;
        io::copy(&mut input, &mut writer).map_err(|e| format!("Failed to write {name}: {e}"))?;
    }

    let mut staging = writer
        .finish()
        .map_err(|e| format!("Failed to finalize archive: {e}"))?;
    staging
        .flush()
        .map_err(|e| format!("Failed to flush archive: {e}"))?;

    staging
        .persist(dest_zip)
        .map_err(|e| format!("Failed to move archive into place: {e}"))?;

    log::debug!("Packed {} files into {}", files.len(), dest_zip.display());
    Ok(files.len())
}
