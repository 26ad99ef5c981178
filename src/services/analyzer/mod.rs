//! Resume-capability analysis of a course package, read straight from the
//! archive without extracting it.

pub mod rules;
mod types;

pub use rules::{ScriptRule, ScriptScan, SCRIPT_RULES};
pub use types::{AnalysisCounts, AnalysisMetadata, AnalysisReport};

use crate::services::archive::{self, ArchiveEntry};
use crate::services::config::EngineSettings;
use crate::services::manifest::{find_manifest_entry, ManifestDocument};
use crate::types::{Package, PackageError};

/// Upper bound for reading a single manifest into memory.
const MAX_MANIFEST_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// How many script files (in archive order) to scan.
    pub script_scan_limit: usize,
    pub max_script_bytes: u64,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            script_scan_limit: 10,
            max_script_bytes: 2 * 1024 * 1024,
        }
    }
}

impl From<&EngineSettings> for AnalyzerOptions {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            script_scan_limit: settings.script_scan_limit,
            max_script_bytes: settings.max_script_bytes,
        }
    }
}

/// Classify a package. Never fails: problems are reported with `success: false`.
pub fn analyze_package(package: &Package, options: &AnalyzerOptions) -> AnalysisReport {
    let entries = match archive::list_entries(&package.source_path) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read {}: {e}", package.source_path.display());
            return AnalysisReport::failed(&PackageError::FilesystemFailure(e), Vec::new());
        }
    };

    let manifest_entry = match find_manifest_entry(&entries) {
        Some(entry) => entry,
        None => {
            log::info!("No manifest in {}", package.file_name());
            return AnalysisReport::failed(&PackageError::MissingManifest, Vec::new());
        }
    };

    let found = format!("Manifest found at {}", manifest_entry.name);
    let text = match archive::read_entry_to_string(
        &package.source_path,
        &manifest_entry.name,
        MAX_MANIFEST_BYTES,
    ) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Cannot read {} in {}: {e}", manifest_entry.name, package.file_name());
            return AnalysisReport::failed(&PackageError::FilesystemFailure(e), vec![found])
                .with_manifest(&manifest_entry.name);
        }
    };

    let document = match ManifestDocument::parse(&text) {
        Ok(doc) => doc,
        Err(e) => {
            log::info!("Malformed manifest in {}: {e}", package.file_name());
            return AnalysisReport::failed(&e, vec![found]).with_manifest(&manifest_entry.name);
        }
    };

    let scan = scan_scripts(package, &entries, options);
    let report = build_report(&document, &manifest_entry.name, &scan);
    log::info!(
        "Analyzed {}: resume_capable={}",
        package.file_name(),
        report.resume_capable
    );
    report
}

/// Scan the first `script_scan_limit` scripts of the archive. Unreadable
/// scripts are skipped but still count toward the limit.
pub fn scan_scripts(
    package: &Package,
    entries: &[ArchiveEntry],
    options: &AnalyzerOptions,
) -> ScriptScan {
    let mut scan = ScriptScan::default();

    let scripts = entries
        .iter()
        .filter(|e| !e.is_dir && rules::is_script_name(&e.name))
        .take(options.script_scan_limit);

    for script in scripts {
        match archive::read_entry_to_string(
            &package.source_path,
            &script.name,
            options.max_script_bytes,
        ) {
            Ok(source) => scan.record(&script.name, &source),
            Err(e) => log::warn!("Skipping unreadable script {}: {e}", script.name),
        }
    }

    scan
}

fn build_report(document: &ManifestDocument, manifest_path: &str, scan: &ScriptScan) -> AnalysisReport {
    let counts = AnalysisCounts {
        organizations: document.organization_count(),
        items: document.referencing_item_count(),
        sco_resources: document.sco_resource_count(),
        scripts_scanned: scan.files_scanned.len(),
    };

    let metadata = AnalysisMetadata {
        version: document.schema_version().map(str::to_string),
        title: document.title(),
        launch_file: document.launch_href().map(str::to_string),
    };

    let mut details = vec![format!("Manifest found at {manifest_path}")];
    match &metadata.version {
        Some(v) => details.push(format!("SCORM version: {v}")),
        None => details.push("No schema version declared".to_string()),
    }
    details.push(format!(
        "{} organization(s), {} item(s) referencing resources",
        counts.organizations, counts.items
    ));
    details.push(format!("{} SCO resource(s) declared", counts.sco_resources));
    details.push(format!("Scanned {} script file(s)", counts.scripts_scanned));
    for finding in &scan.findings {
        details.push(format!("Script scan: {finding}"));
    }

    let resume_capable = counts.sco_resources > 0 || scan.resume_evidence;
    if counts.sco_resources > 0 {
        details.push("Resume supported: manifest declares SCO resources".to_string());
    } else if scan.resume_evidence {
        details.push(
            "Resume supported: scripts persist suspend data or bookmark location".to_string(),
        );
    } else {
        details.push(
            "No resume support detected: no SCO resources and no persistence calls in scanned scripts"
                .to_string(),
        );
        details.push(
            "Note: runtime-only persistence cannot be ruled out by static inspection".to_string(),
        );
    }

    AnalysisReport {
        success: true,
        has_manifest: true,
        resume_capable,
        manifest_path: Some(manifest_path.to_string()),
        details,
        metadata,
        counts,
        error: None,
    }
}

#[cfg(test)]
#[path = "tests/analyzer_tests.rs"]
mod tests;
