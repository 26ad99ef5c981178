use crate::types::PackageError;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub version: Option<String>,
    pub title: Option<String>,
    pub launch_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCounts {
    pub organizations: usize,
    pub items: usize,
    pub sco_resources: usize,
    pub scripts_scanned: usize,
}

/// Read-only classification of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub success: bool,
    pub has_manifest: bool,
    pub resume_capable: bool,
    pub manifest_path: Option<String>,
    pub details: Vec<String>,
    pub metadata: AnalysisMetadata,
    pub counts: AnalysisCounts,
    pub error: Option<String>,
}

impl AnalysisReport {
    pub fn failed(error: &PackageError, details: Vec<String>) -> Self {
        Self {
            success: false,
            details,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Mark a failed report as having located its manifest at `path`.
    pub fn with_manifest(mut self, path: &str) -> Self {
        self.has_manifest = true;
        self.manifest_path = Some(path.to_string());
        self
    }
}
