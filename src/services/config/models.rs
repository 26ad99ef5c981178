use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Launch file names tried in order when a manifest href is broken or missing.
/// Authoring-tool specific names come first, then `index` variants, then
/// generic `launch`/`default` pages.
pub const DEFAULT_LAUNCH_CANDIDATES: &[&str] = &[
    "story.html",
    "story_html5.html",
    "index_lms.html",
    "index_lms_html5.html",
    "presentation.html",
    "launcher.html",
    "index.html",
    "index.htm",
    "launch.html",
    "launch.htm",
    "default.html",
    "default.htm",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSettings {
    /// Root of the repaired/instrumented/session storage areas.
    pub data_dir: PathBuf,
    /// URL of the externally served API shim referenced from launch pages.
    pub shim_url: String,
    pub script_scan_limit: usize,
    pub max_script_bytes: u64,
    pub max_archive_bytes: u64,
    pub default_schema_version: String,
    pub repaired_suffix: String,
    pub instrumented_suffix: String,
    pub launch_candidates: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("scormfix-data"),
            shim_url: "/scorm-api-shim.js".into(),
            script_scan_limit: 10,
            max_script_bytes: 2 * 1024 * 1024,
            max_archive_bytes: 500 * 1024 * 1024,
            default_schema_version: "1.2".into(),
            repaired_suffix: "_repaired.zip".into(),
            instrumented_suffix: "_instrumented.zip".into(),
            launch_candidates: DEFAULT_LAUNCH_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
