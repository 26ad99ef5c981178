//! Engine operations as callers use them: each takes an archive path,
//! enforces the size ceiling and turns every failure into a report.

use crate::services::analyzer::{analyze_package, AnalysisReport, AnalyzerOptions};
use crate::services::config::EngineSettings;
use crate::services::instrument::{self, snippets, InstrumentSummary};
use crate::services::repair::{repair_package, RepairReport};
use crate::services::session::{PlayerSession, PlayerSessionStore};
use crate::services::storage::{derived_archive_name, StorageLayout};
use crate::types::{Package, PackageError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Repair result plus the session it was materialized into, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOutcome {
    pub report: RepairReport,
    pub session: Option<PlayerSession>,
}

impl PlayOutcome {
    /// Repaired, materialized and with a page to launch.
    pub fn is_playable(&self) -> bool {
        self.report.success
            && self
                .session
                .as_ref()
                .is_some_and(|s| s.launch_file.is_some())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentReport {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub summary: InstrumentSummary,
    pub error: Option<String>,
}

pub fn open_package(path: &Path, settings: &EngineSettings) -> Result<Package, PackageError> {
    Package::open_with_limit(path, settings.max_archive_bytes)
}

pub fn analyze_path(path: &Path, settings: &EngineSettings) -> AnalysisReport {
    match open_package(path, settings) {
        Ok(package) => analyze_package(&package, &AnalyzerOptions::from(settings)),
        Err(e) => {
            log::warn!("Cannot analyze {}: {e}", path.display());
            AnalysisReport::failed(&e, Vec::new())
        }
    }
}

/// Repair into the repaired area as `<stem>_repaired.zip`.
pub fn repair_to_storage(
    path: &Path,
    layout: &StorageLayout,
    settings: &EngineSettings,
) -> RepairReport {
    let package = match open_package(path, settings) {
        Ok(package) => package,
        Err(e) => return RepairReport::failed(&e),
    };

    let out_dir = layout.repaired_dir();
    if let Err(e) = fs::create_dir_all(&out_dir) {
        return RepairReport::failed(&PackageError::from(e));
    }

    let output = out_dir.join(derived_archive_name(path, &settings.repaired_suffix));
    repair_package(&package, &output, settings)
}

/// Repair to `output`, then materialize the result as a player session.
/// A session that cannot be created is reported as a warning.
pub fn repair_and_play(
    path: &Path,
    output: &Path,
    store: &PlayerSessionStore,
    settings: &EngineSettings,
) -> PlayOutcome {
    let mut report = match open_package(path, settings) {
        Ok(package) => repair_package(&package, output, settings),
        Err(e) => RepairReport::failed(&e),
    };

    let session = if report.success {
        match store.create(output) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("No session for {}: {e}", path.display());
                report.warnings.push(format!("Session not created: {e}"));
                None
            }
        }
    } else {
        None
    };

    PlayOutcome { report, session }
}

/// Build the fully instrumented copy (API shim plus event tracker) in the
/// instrumented area as `<stem>_instrumented.zip`.
pub fn instrument_to_storage(
    path: &Path,
    layout: &StorageLayout,
    settings: &EngineSettings,
) -> InstrumentReport {
    let result = open_package(path, settings).and_then(|package| {
        let out_dir = layout.instrumented_dir();
        fs::create_dir_all(&out_dir)?;
        let output = out_dir.join(derived_archive_name(path, &settings.instrumented_suffix));

        let snippets = [
            snippets::api_shim_snippet(&settings.shim_url),
            snippets::event_tracker_snippet(),
        ];
        let summary = instrument::build_instrumented_archive(&package, &output, &snippets)?;
        Ok((output, summary))
    });

    match result {
        Ok((output, summary)) => InstrumentReport {
            success: true,
            output_path: Some(output),
            summary,
            error: None,
        },
        Err(e) => {
            log::error!("Instrumentation of {} failed: {e}", path.display());
            InstrumentReport {
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::archive;
    use crate::services::instrument::snippets::{SHIM_MARKER, TRACKER_MARKER};
    use crate::test_utils::{create_test_zip, init_test_logger, manifest_xml};
    use tempfile::TempDir;

    const PAGE: &[u8] = b"<html><head></head><body>hi</body></html>";

    fn setup() -> (TempDir, PathBuf, EngineSettings) {
        init_test_logger();
        let dir = TempDir::new().unwrap();
        let manifest = manifest_xml("index.html", None);
        let zip = create_test_zip(
            dir.path(),
            "course.zip",
            &[("imsmanifest.xml", manifest.as_bytes()), ("index.html", PAGE)],
        );
        let settings = EngineSettings {
            data_dir: dir.path().join("data"),
            ..Default::default()
        };
        (dir, zip, settings)
    }

    #[test]
    fn test_analyze_path_reports_missing_input() {
        let (dir, _, settings) = setup();
        let report = analyze_path(&dir.path().join("nope.zip"), &settings);

        assert!(!report.success);
        assert!(report.error.unwrap().starts_with("Archive input unavailable"));
    }

    #[test]
    fn test_size_ceiling_is_enforced() {
        let (_dir, zip, mut settings) = setup();
        settings.max_archive_bytes = 16;

        let report = analyze_path(&zip, &settings);
        assert!(!report.success);
        assert!(report.error.unwrap().contains("limit is 16 bytes"));
    }

    #[test]
    fn test_repair_to_storage_uses_repaired_area() {
        let (_dir, zip, settings) = setup();
        let layout = StorageLayout::new(&settings.data_dir);

        let report = repair_to_storage(&zip, &layout, &settings);
        assert!(report.success);
        assert_eq!(
            report.output_path,
            Some(layout.repaired_dir().join("course_repaired.zip"))
        );
    }

    #[test]
    fn test_repair_and_play_creates_playable_session() {
        let (dir, zip, settings) = setup();
        let store = PlayerSessionStore::new(dir.path().join("sessions"), &settings);

        let outcome = repair_and_play(&zip, &dir.path().join("out.zip"), &store, &settings);

        assert!(outcome.is_playable());
        let session = outcome.session.unwrap();
        assert_eq!(session.launch_file.as_deref(), Some("index.html"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_repair_creates_no_session() {
        let (dir, _, settings) = setup();
        let broken = dir.path().join("broken.zip");
        fs::write(&broken, b"garbage").unwrap();
        let store = PlayerSessionStore::new(dir.path().join("sessions"), &settings);

        let outcome = repair_and_play(&broken, &dir.path().join("out.zip"), &store, &settings);

        assert!(!outcome.report.success);
        assert!(outcome.session.is_none());
        assert!(!outcome.is_playable());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_instrumented_copy_is_independent_of_repair_output() {
        let (_dir, zip, settings) = setup();
        let layout = StorageLayout::new(&settings.data_dir);

        let repaired = repair_to_storage(&zip, &layout, &settings);
        let instrumented = instrument_to_storage(&zip, &layout, &settings);

        assert!(instrumented.success);
        assert_eq!(instrumented.summary.injections, 2);
        let output = instrumented.output_path.unwrap();
        assert_eq!(output, layout.instrumented_dir().join("course_instrumented.zip"));

        let page = archive::read_entry_to_string(&output, "index.html", u64::MAX).unwrap();
        assert_eq!(page.matches(SHIM_MARKER).count(), 1);
        assert_eq!(page.matches(TRACKER_MARKER).count(), 1);
        let shim_at = page.find(SHIM_MARKER).unwrap();
        let tracker_at = page.find(TRACKER_MARKER).unwrap();
        assert!(shim_at < tracker_at, "shim must load before the tracker");

        let repaired_page = archive::read_entry_to_string(
            &repaired.output_path.unwrap(),
            "index.html",
            u64::MAX,
        )
        .unwrap();
        assert_eq!(repaired_page.matches(SHIM_MARKER).count(), 1);
        assert!(!repaired_page.contains(TRACKER_MARKER));
    }
}
