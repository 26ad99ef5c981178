//! Folder-wide analysis or repair. Each archive is processed on its own;
//! a failing archive becomes a failed entry and never stops the batch.

mod types;

pub use types::{
    AnalyzeSummary, BatchEntry, BatchMode, BatchOutcome, BatchResult, RepairSummary, Summarize,
};

use crate::services::analyzer::AnalysisReport;
use crate::services::config::EngineSettings;
use crate::services::pipeline::{self, PlayOutcome};
use crate::services::session::PlayerSessionStore;
use crate::services::storage::derived_archive_name;
use crate::types::PackageError;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub mode: BatchMode,
    /// Process archives on the rayon pool. Result order is unchanged.
    pub parallel: bool,
}

fn has_suffix_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Archives directly inside `folder`, sorted by file name. Outputs of earlier
/// runs (repaired and instrumented copies) are skipped.
pub fn list_packages(
    folder: &Path,
    settings: &EngineSettings,
) -> Result<Vec<PathBuf>, PackageError> {
    if !folder.is_dir() {
        return Err(PackageError::MissingArchiveInput(format!(
            "{} is not a folder",
            folder.display()
        )));
    }

    let mut packages: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(regular_file)
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            has_suffix_ignore_case(&name, ".zip")
                && !has_suffix_ignore_case(&name, &settings.repaired_suffix)
                && !has_suffix_ignore_case(&name, &settings.instrumented_suffix)
        })
        .collect();

    packages.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(packages)
}

/// Path of a regular file entry. Unreadable entries are logged and skipped.
fn regular_file(entry: std::io::Result<fs::DirEntry>) -> Option<PathBuf> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            log::warn!("Skipping unreadable entry: {e}");
            return None;
        }
    };
    match entry.file_type() {
        Ok(file_type) => file_type.is_file().then(|| entry.path()),
        Err(e) => {
            log::warn!("Skipping {}: {e}", entry.path().display());
            None
        }
    }
}

fn run_each<R, F>(paths: &[PathBuf], parallel: bool, process: F) -> Vec<BatchEntry<R>>
where
    R: Send,
    F: Fn(&Path) -> R + Sync + Send,
{
    let entry = |path: &PathBuf| {
        log::debug!("Batch item {}", path.display());
        BatchEntry::new(path, process(path))
    };

    if parallel {
        paths.par_iter().map(entry).collect()
    } else {
        paths.iter().map(entry).collect()
    }
}

pub fn analyze_folder(
    folder: &Path,
    settings: &EngineSettings,
    parallel: bool,
) -> Result<BatchResult<AnalyzeSummary, AnalysisReport>, PackageError> {
    let packages = list_packages(folder, settings)?;
    log::info!("Analyzing {} archive(s) in {}", packages.len(), folder.display());

    let results = run_each(&packages, parallel, |path| pipeline::analyze_path(path, settings));
    Ok(BatchResult::new(folder, results))
}

/// Repair every archive to `<stem>_repaired.zip` beside it and open a player
/// session for each successful repair.
pub fn repair_folder(
    folder: &Path,
    store: &PlayerSessionStore,
    settings: &EngineSettings,
    parallel: bool,
) -> Result<BatchResult<RepairSummary, PlayOutcome>, PackageError> {
    let packages = list_packages(folder, settings)?;
    log::info!("Repairing {} archive(s) in {}", packages.len(), folder.display());

    let results = run_each(&packages, parallel, |path| {
        let output = path.with_file_name(derived_archive_name(path, &settings.repaired_suffix));
        pipeline::repair_and_play(path, &output, store, settings)
    });
    Ok(BatchResult::new(folder, results))
}

pub fn run_batch(
    folder: &Path,
    options: BatchOptions,
    store: &PlayerSessionStore,
    settings: &EngineSettings,
) -> Result<BatchOutcome, PackageError> {
    match options.mode {
        BatchMode::Analyze => {
            analyze_folder(folder, settings, options.parallel).map(BatchOutcome::Analyze)
        }
        BatchMode::Repair => {
            repair_folder(folder, store, settings, options.parallel).map(BatchOutcome::Repair)
        }
    }
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
