//! Launch file resolution inside an extracted package tree.

use crate::services::archive::safe_relative_path;
use crate::services::instrument::is_html_path;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Href written into a manifest when the package contains no HTML at all.
pub const PLACEHOLDER_HREF: &str = "index.html";

fn files_under(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
}

/// Resolve a manifest href against `base_dir`. Query and fragment are
/// dropped and percent escapes decoded. Returns the file when it exists.
pub fn resolve_href(base_dir: &Path, href: &str) -> Option<PathBuf> {
    let path_part = href.split(['?', '#']).next().unwrap_or_default().trim();
    if path_part.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(path_part)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path_part.to_string());
    let relative = safe_relative_path(&decoded)?;

    let candidate = base_dir.join(relative);
    candidate.is_file().then_some(candidate)
}

/// Find the launch page below `root`.
///
/// Candidate names are tried in priority order, each matched
/// case-insensitively at any depth with the shallowest hit winning. When no
/// candidate exists the first HTML file in depth-first order is used.
pub fn find_launch_file(root: &Path, candidates: &[String]) -> Option<PathBuf> {
    for candidate in candidates {
        let wanted = candidate.to_lowercase();
        let hit = files_under(root)
            .filter(|e| e.file_name().to_string_lossy().to_lowercase() == wanted)
            .enumerate()
            .min_by_key(|(index, e)| (e.depth(), *index))
            .map(|(_, e)| e.into_path());
        if hit.is_some() {
            return hit;
        }
    }

    files_under(root)
        .find(|e| is_html_path(e.path()))
        .map(|e| e.into_path())
}

/// Forward-slash path of `path` relative to `base_dir`, as used in hrefs.
pub fn relative_href(base_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
