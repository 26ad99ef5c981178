mod common;

use common::{broken_export_manifest, init_logger, read_entry, write_zip, PAGE};
use scormfix_lib::services::config::EngineSettings;
use scormfix_lib::services::instrument::snippets::SHIM_MARKER;
use scormfix_lib::services::manifest::ManifestDocument;
use scormfix_lib::services::pipeline;
use scormfix_lib::services::session::PlayerSessionStore;
use scormfix_lib::services::storage::StorageLayout;
use tempfile::tempdir;

#[test]
fn broken_export_becomes_resume_capable_after_repair() {
    init_logger();
    let dir = tempdir().expect("temp dir should be created");
    let manifest = broken_export_manifest();
    let zip = write_zip(
        dir.path(),
        "safety.zip",
        &[
            ("imsmanifest.xml", manifest.as_bytes()),
            ("story.html", PAGE),
            ("story_content/user.js", b"var player = {};"),
        ],
    );
    let settings = EngineSettings {
        data_dir: dir.path().join("data"),
        ..Default::default()
    };
    let layout = StorageLayout::new(&settings.data_dir);

    let before = pipeline::analyze_path(&zip, &settings);
    assert!(before.success);
    assert!(!before.resume_capable);

    let report = pipeline::repair_to_storage(&zip, &layout, &settings);
    assert!(report.success, "repair failed: {:?}", report.error);
    assert_eq!(
        report.repairs,
        vec![
            "Added adlcp namespace declaration",
            "Added schema metadata (metadata, schema, schemaversion)",
            "Set SCO type on primary resource",
            "Fixed broken launch file: 'missing.html' -> 'story.html'",
            "Injected API shim into story.html",
        ]
    );

    let output = report.output_path.expect("output path should be reported");
    let repaired = ManifestDocument::parse(&read_entry(&output, "imsmanifest.xml"))
        .expect("repaired manifest should parse");
    assert_eq!(repaired.launch_href(), Some("story.html"));
    assert_eq!(repaired.title().as_deref(), Some("Workplace Safety"));
    assert_eq!(read_entry(&output, "story.html").matches(SHIM_MARKER).count(), 1);

    let after = pipeline::analyze_path(&output, &settings);
    assert!(after.resume_capable);
    assert_eq!(after.metadata.version.as_deref(), Some("1.2"));
}

#[test]
fn repaired_package_plays_from_its_launch_page() {
    init_logger();
    let dir = tempdir().expect("temp dir should be created");
    let zip = write_zip(
        dir.path(),
        "bare.zip",
        &[("html5/index_lms.html", PAGE), ("html5/data/a.js", b"1")],
    );
    let settings = EngineSettings::default();
    let store = PlayerSessionStore::new(dir.path().join("sessions"), &settings);

    let outcome =
        pipeline::repair_and_play(&zip, &dir.path().join("bare_repaired.zip"), &store, &settings);

    assert!(outcome.is_playable());
    assert_eq!(
        outcome.report.launch_file.as_deref(),
        Some("html5/index_lms.html")
    );
    let session = outcome.session.expect("session should exist");
    let launch = store
        .resolve_file(&session.session_id, "html5/index_lms.html")
        .expect("launch page should resolve");
    let page = std::fs::read_to_string(launch).expect("launch page should be readable");
    assert_eq!(page.matches(SHIM_MARKER).count(), 1);
}
