//! Engine settings: JSON file with defaults, environment overrides and
//! atomic saves.

pub mod models;

pub use models::*;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const ENV_DATA_DIR: &str = "SCORMFIX_DATA_DIR";
pub const ENV_SHIM_URL: &str = "SCORMFIX_SHIM_URL";

pub struct ConfigService {
    config_path: Option<PathBuf>,
    settings: Mutex<EngineSettings>,
}

impl ConfigService {
    /// Load settings from `config_path` when it exists, defaults otherwise.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, String> {
        let settings = match &config_path {
            Some(path) if path.exists() => Self::read_settings(path)?,
            Some(path) => {
                log::debug!("No config at {}, using defaults", path.display());
                EngineSettings::default()
            }
            None => EngineSettings::default(),
        };

        Ok(Self {
            config_path,
            settings: Mutex::new(settings),
        })
    }

    fn read_settings(path: &Path) -> Result<EngineSettings, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid config {}: {e}", path.display()))
    }

    pub fn get_settings(&self) -> EngineSettings {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the settings and persist them when a config path is set.
    ///
    /// The file is written to a temporary sibling and renamed over the
    /// target so readers never observe a half-written config.
    pub fn save_settings(&self, new_settings: EngineSettings) -> Result<(), String> {
        if let Some(path) = &self.config_path {
            let json = serde_json::to_string_pretty(&new_settings)
                .map_err(|e| format!("Failed to serialize settings: {e}"))?;

            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {e}"))?;

            let mut tmp = tempfile::NamedTempFile::new_in(parent)
                .map_err(|e| format!("Failed to create temp config: {e}"))?;
            tmp.write_all(json.as_bytes())
                .map_err(|e| format!("Failed to write temp config: {e}"))?;
            tmp.persist(path)
                .map_err(|e| format!("Failed to replace config: {e}"))?;
        }

        *self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_settings;
        Ok(())
    }
}

/// Apply `SCORMFIX_*` environment overrides on top of loaded settings.
pub fn apply_env_overrides(settings: &mut EngineSettings) {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        if !dir.trim().is_empty() {
            settings.data_dir = PathBuf::from(dir);
        }
    }
    if let Ok(url) = std::env::var(ENV_SHIM_URL) {
        if !url.trim().is_empty() {
            settings.shim_url = url;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
