//! Idempotent injection of script snippets into HTML documents.
//!
//! Each snippet carries a marker string; a document already containing the
//! marker is left alone, so running the injector repeatedly yields exactly
//! one copy per snippet per document. Documents are handled as raw bytes
//! and are preserved byte-for-byte outside the insertion point.

pub mod snippets;

use crate::services::archive;
use crate::types::{Package, PackageError};
use regex::bytes::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("valid head open regex"));
static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("valid head close regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub marker: String,
    pub markup: String,
}

impl Snippet {
    pub fn new(marker: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            markup: markup.into(),
        }
    }
}

/// Where a snippet ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InsertionPoint {
    AfterHeadOpen,
    BeforeHeadClose,
    Prepended,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSummary {
    pub documents_scanned: usize,
    pub documents_modified: usize,
    pub injections: usize,
}

pub fn is_html_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Insert `snippet` into `document`: after the opening head tag, else before
/// the closing head tag, else at the very start. Returns `None` when the
/// document already carries the snippet's marker.
pub fn inject_snippet(document: &[u8], snippet: &Snippet) -> Option<(Vec<u8>, InsertionPoint)> {
    inject_snippets(document, std::slice::from_ref(snippet)).map(|(out, point, _)| (out, point))
}

/// Insert every snippet whose marker is missing, in list order, at one
/// insertion point. Snippets already present directly at that point stay
/// ahead of the new ones, so document order always follows list order.
/// Returns the updated document, the insertion point and the number of
/// snippets inserted, or `None` when nothing was missing.
pub fn inject_snippets(
    document: &[u8],
    snippets: &[Snippet],
) -> Option<(Vec<u8>, InsertionPoint, usize)> {
    let (present, pending): (Vec<&Snippet>, Vec<&Snippet>) = snippets
        .iter()
        .partition(|s| contains_bytes(document, s.marker.as_bytes()));
    if pending.is_empty() {
        return None;
    }

    let (mut at, point) = if let Some(m) = HEAD_OPEN_RE.find(document) {
        (m.end(), InsertionPoint::AfterHeadOpen)
    } else if let Some(m) = HEAD_CLOSE_RE.find(document) {
        (m.start(), InsertionPoint::BeforeHeadClose)
    } else {
        (0, InsertionPoint::Prepended)
    };

    if point != InsertionPoint::BeforeHeadClose {
        at = skip_injected(document, at, &present, point == InsertionPoint::Prepended);
    }

    let markup: Vec<u8> = pending
        .iter()
        .flat_map(|s| s.markup.as_bytes().iter().copied())
        .collect();
    let mut out = Vec::with_capacity(document.len() + markup.len() + 1);
    out.extend_from_slice(&document[..at]);
    out.extend_from_slice(&markup);
    if point == InsertionPoint::Prepended {
        out.push(b'\n');
    }
    out.extend_from_slice(&document[at..]);
    Some((out, point, pending.len()))
}

/// Move `at` past snippet markup already sitting at the insertion point.
fn skip_injected(document: &[u8], mut at: usize, present: &[&Snippet], prepended: bool) -> usize {
    loop {
        let rest = &document[at..];
        let Some(snippet) = present
            .iter()
            .find(|s| rest.starts_with(s.markup.as_bytes()))
        else {
            return at;
        };
        at += snippet.markup.len();
        if prepended && document.get(at) == Some(&b'\n') {
            at += 1;
        }
    }
}

/// Apply every snippet to one file. Returns how many snippets were inserted.
pub fn inject_file(path: &Path, snippets: &[Snippet]) -> Result<usize, String> {
    let document =
        fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;

    let Some((updated, point, injected)) = inject_snippets(&document, snippets) else {
        return Ok(0);
    };
    log::debug!(
        "Injected {injected} snippet(s) into {} ({:?})",
        path.display(),
        point
    );
    fs::write(path, &updated).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    Ok(injected)
}

/// Apply every snippet to every HTML document below `root`.
pub fn instrument_tree(root: &Path, snippets: &[Snippet]) -> Result<InstrumentSummary, String> {
    let mut summary = InstrumentSummary::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("Failed to walk {}: {e}", root.display()))?;
        if !entry.file_type().is_file() || !is_html_path(entry.path()) {
            continue;
        }

        summary.documents_scanned += 1;
        let injected = inject_file(entry.path(), snippets)?;
        if injected > 0 {
            summary.documents_modified += 1;
            summary.injections += injected;
        }
    }

    Ok(summary)
}

/// Build a fully instrumented copy of the original package at `output`.
///
/// Works on its own extraction of the source archive; the repair output is
/// never touched.
pub fn build_instrumented_archive(
    package: &Package,
    output: &Path,
    snippets: &[Snippet],
) -> Result<InstrumentSummary, PackageError> {
    let work = tempfile::Builder::new()
        .prefix("scormfix-instrument-")
        .tempdir()?;

    archive::extract_zip(&package.source_path, work.path())
        .map_err(PackageError::FilesystemFailure)?;
    let summary = instrument_tree(work.path(), snippets).map_err(PackageError::FilesystemFailure)?;
    archive::pack_directory(work.path(), output).map_err(PackageError::FilesystemFailure)?;

    log::info!(
        "Instrumented {} of {} documents in {}",
        summary.documents_modified,
        summary.documents_scanned,
        package.file_name()
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "tests/instrument_tests.rs"]
mod tests;
