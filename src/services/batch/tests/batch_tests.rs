use super::*;
use crate::test_utils::{create_test_zip, init_test_logger, manifest_xml};
use tempfile::TempDir;

const PAGE: &[u8] = b"<html><head></head><body></body></html>";

/// Folder with one SCO course, one plain course, one broken archive and
/// leftovers from earlier runs.
fn populated_folder() -> (TempDir, PathBuf) {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("courses");
    fs::create_dir_all(&folder).unwrap();

    let sco = manifest_xml("index.html", Some("sco"));
    create_test_zip(
        &folder,
        "b_sco.zip",
        &[("imsmanifest.xml", sco.as_bytes()), ("index.html", PAGE)],
    );
    create_test_zip(&folder, "a_plain.ZIP", &[("story.html", PAGE)]);
    fs::write(folder.join("c_broken.zip"), b"not a zip").unwrap();

    create_test_zip(&folder, "old_repaired.zip", &[("x.html", PAGE)]);
    create_test_zip(&folder, "old_Instrumented.zip", &[("x.html", PAGE)]);
    fs::write(folder.join("notes.txt"), "skip me").unwrap();
    fs::create_dir_all(folder.join("nested.zip")).unwrap();

    (dir, folder)
}

#[test]
fn test_list_packages_filters_and_sorts() {
    let (_dir, folder) = populated_folder();
    let names: Vec<String> = list_packages(&folder, &EngineSettings::default())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["a_plain.ZIP", "b_sco.zip", "c_broken.zip"]);
}

#[test]
fn test_unreadable_entries_are_skipped() {
    init_test_logger();
    let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    assert_eq!(regular_file(Err(denied)), None);

    let (_dir, folder) = populated_folder();
    let files: Vec<PathBuf> = fs::read_dir(&folder)
        .unwrap()
        .filter_map(regular_file)
        .collect();
    assert!(files.contains(&folder.join("notes.txt")));
    assert!(!files.contains(&folder.join("nested.zip")));
}

#[test]
fn test_missing_folder_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        list_packages(&dir.path().join("absent"), &EngineSettings::default()),
        Err(PackageError::MissingArchiveInput(_))
    ));
}

#[test]
fn test_analyze_summary_is_derived_from_results() {
    let (_dir, folder) = populated_folder();
    let batch = analyze_folder(&folder, &EngineSettings::default(), false).unwrap();

    assert_eq!(batch.folder_path, folder);
    assert_eq!(batch.summary.total_files, batch.results.len());
    assert_eq!(
        batch.summary.failed,
        batch.results.iter().filter(|r| !r.outcome.success).count()
    );
    assert_eq!(
        batch.summary,
        AnalyzeSummary {
            total_files: 3,
            successfully_analyzed: 1,
            resume_capable: 1,
            failed: 2,
        }
    );
    assert_eq!(batch.results[1].file_name, "b_sco.zip");
    assert_eq!(batch.results[1].path, folder.join("b_sco.zip"));
}

#[test]
fn test_repair_batch_isolates_failures() {
    let (dir, folder) = populated_folder();
    let settings = EngineSettings::default();
    let store = PlayerSessionStore::new(dir.path().join("sessions"), &settings);

    let batch = repair_folder(&folder, &store, &settings, false).unwrap();

    assert_eq!(
        batch.summary,
        RepairSummary {
            total_files: 3,
            repaired: 2,
            playable: 2,
            failed: 1,
        }
    );
    assert!(folder.join("a_plain_repaired.zip").exists());
    assert!(folder.join("b_sco_repaired.zip").exists());
    assert!(!folder.join("c_broken_repaired.zip").exists());
    assert!(!batch.results[2].outcome.report.success);
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn test_repair_outputs_are_skipped_on_rerun() {
    let (dir, folder) = populated_folder();
    let settings = EngineSettings::default();
    let store = PlayerSessionStore::new(dir.path().join("sessions"), &settings);

    repair_folder(&folder, &store, &settings, false).unwrap();
    let again = repair_folder(&folder, &store, &settings, false).unwrap();

    assert_eq!(again.summary.total_files, 3);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let (_dir, folder) = populated_folder();
    let settings = EngineSettings::default();

    let sequential = analyze_folder(&folder, &settings, false).unwrap();
    let parallel = analyze_folder(&folder, &settings, true).unwrap();

    assert_eq!(sequential.summary, parallel.summary);
    let names = |b: &BatchResult<AnalyzeSummary, AnalysisReport>| -> Vec<String> {
        b.results.iter().map(|r| r.file_name.clone()).collect()
    };
    assert_eq!(names(&sequential), names(&parallel));
}

#[test]
fn test_run_batch_serializes_flat_entries() {
    let (dir, folder) = populated_folder();
    let settings = EngineSettings::default();
    let store = PlayerSessionStore::new(dir.path().join("sessions"), &settings);

    let outcome = run_batch(&folder, BatchOptions::default(), &store, &settings).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["summary"]["totalFiles"], 3);
    assert_eq!(json["results"][0]["fileName"], "a_plain.ZIP");
    assert_eq!(json["results"][0]["hasManifest"], false);
    assert!(json["folderPath"].is_string());
}
