use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extract every entry of a ZIP archive below `dest_path`.
///
/// Entries whose names would escape `dest_path` are skipped. Returns the
/// number of files written (directories are not counted).
pub fn extract_zip(archive_path: &Path, dest_path: &Path) -> Result<usize, String> {
    let file = fs::File::open(archive_path).map_err(|e| format!("Failed to open archive: {e}"))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| format!("Invalid or corrupt ZIP: {e}"))?;

    fs::create_dir_all(dest_path).map_err(|e| format!("Failed to create destination: {e}"))?;

    let mut count: usize = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read entry {i}: {e}"))?;

        let entry_path = match safe_relative_path(entry.name()) {
            Some(p) => p,
            None => {
                log::warn!("Skipping unsafe archive entry: {}", entry.name());
                continue;
            }
        };

        let output_path = dest_path.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path).map_err(|e| format!("Failed to create dir: {e}"))?;
        } else {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| format!("Failed to create parent: {e}"))?;
            }
            let mut outfile = fs::File::create(&output_path)
                .map_err(|e| format!("Failed to create file: {e}"))?;
            io::copy(&mut entry, &mut outfile).map_err(|e| format!("Failed to write file: {e}"))?;
            count += 1;
        }
    }

    log::debug!(
        "Extracted {} files from {} into {}",
        count,
        archive_path.display(),
        dest_path.display()
    );
    Ok(count)
}

/// Turn an archive entry name into a relative path that stays inside the
/// extraction root. Backslash separators are accepted.
pub(crate) fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let candidate = Path::new(&normalized);

    let mut out = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}
