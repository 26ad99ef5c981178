use crate::services::analyzer::AnalysisReport;
use crate::services::pipeline::PlayOutcome;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchMode {
    #[default]
    Analyze,
    Repair,
}

/// One processed archive, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry<R> {
    pub file_name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: R,
}

impl<R> BatchEntry<R> {
    pub fn new(path: &Path, outcome: R) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            outcome,
        }
    }
}

/// Summary computed from a finished result list.
pub trait Summarize<R> {
    fn summarize(results: &[BatchEntry<R>]) -> Self;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeSummary {
    pub total_files: usize,
    pub successfully_analyzed: usize,
    pub resume_capable: usize,
    pub failed: usize,
}

impl Summarize<AnalysisReport> for AnalyzeSummary {
    fn summarize(results: &[BatchEntry<AnalysisReport>]) -> Self {
        results.iter().fold(
            AnalyzeSummary {
                total_files: results.len(),
                ..Default::default()
            },
            |mut acc, entry| {
                if entry.outcome.success {
                    acc.successfully_analyzed += 1;
                } else {
                    acc.failed += 1;
                }
                if entry.outcome.resume_capable {
                    acc.resume_capable += 1;
                }
                acc
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairSummary {
    pub total_files: usize,
    pub repaired: usize,
    pub playable: usize,
    pub failed: usize,
}

impl Summarize<PlayOutcome> for RepairSummary {
    fn summarize(results: &[BatchEntry<PlayOutcome>]) -> Self {
        results.iter().fold(
            RepairSummary {
                total_files: results.len(),
                ..Default::default()
            },
            |mut acc, entry| {
                if entry.outcome.report.success {
                    acc.repaired += 1;
                } else {
                    acc.failed += 1;
                }
                if entry.outcome.is_playable() {
                    acc.playable += 1;
                }
                acc
            },
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult<S, R> {
    pub folder_path: PathBuf,
    pub summary: S,
    pub results: Vec<BatchEntry<R>>,
}

impl<S: Summarize<R>, R> BatchResult<S, R> {
    pub fn new(folder: &Path, results: Vec<BatchEntry<R>>) -> Self {
        Self {
            folder_path: folder.to_path_buf(),
            summary: S::summarize(&results),
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Analyze(BatchResult<AnalyzeSummary, AnalysisReport>),
    Repair(BatchResult<RepairSummary, PlayOutcome>),
}
