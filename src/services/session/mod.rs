//! Player sessions: a repaired package extracted into `sessions/<id>/`,
//! addressable by a random id until explicitly destroyed.
//!
//! Each session directory holds a `.session.json` descriptor with the
//! launch file, creation time and the runtime state of the persistence API.

pub mod runtime;

pub use runtime::{SessionRuntime, StatusMessage};

use crate::services::archive::{self, safe_relative_path};
use crate::services::config::EngineSettings;
use crate::services::instrument::{self, snippets, Snippet};
use crate::services::manifest::{find_manifest_in_tree, ManifestDocument};
use crate::services::repair::launch;
use crate::types::PackageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SESSION_DESCRIPTOR: &str = ".session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSession {
    pub session_id: String,
    pub directory: PathBuf,
    /// Launch page relative to `directory`, forward slashes.
    pub launch_file: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// On-disk form of a session. The directory is implied by its location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionDescriptor {
    session_id: String,
    launch_file: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    runtime: SessionRuntime,
}

pub struct PlayerSessionStore {
    root: PathBuf,
    shim: Snippet,
    launch_candidates: Vec<String>,
}

/// Session ids are uuid v4 tokens in simple form (32 lowercase hex digits).
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl PlayerSessionStore {
    pub fn new(root: impl Into<PathBuf>, settings: &EngineSettings) -> Self {
        Self {
            root: root.into(),
            shim: snippets::api_shim_snippet(&settings.shim_url),
            launch_candidates: settings.launch_candidates.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_dir(&self, id: &str) -> Result<PathBuf, PackageError> {
        if !is_valid_session_id(id) {
            return Err(PackageError::InvalidSession(id.to_string()));
        }
        Ok(self.root.join(id))
    }

    fn existing_session_dir(&self, id: &str) -> Result<PathBuf, PackageError> {
        let dir = self.session_dir(id)?;
        if !dir.is_dir() {
            return Err(PackageError::InvalidSession(id.to_string()));
        }
        Ok(dir)
    }

    /// Materialize a repaired archive as a new session.
    pub fn create(&self, repaired_archive: &Path) -> Result<PlayerSession, PackageError> {
        let id = Uuid::new_v4().simple().to_string();
        let dir = self.root.join(&id);
        fs::create_dir_all(&dir)?;

        match self.populate(&id, &dir, repaired_archive) {
            Ok(session) => {
                log::info!(
                    "Created session {} (launch: {})",
                    id,
                    session.launch_file.as_deref().unwrap_or("none")
                );
                Ok(session)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    log::warn!("Failed to clean up session {id}: {cleanup}");
                }
                Err(e)
            }
        }
    }

    fn populate(
        &self,
        id: &str,
        dir: &Path,
        repaired_archive: &Path,
    ) -> Result<PlayerSession, PackageError> {
        archive::extract_zip(repaired_archive, dir).map_err(PackageError::FilesystemFailure)?;

        let summary = instrument::instrument_tree(dir, std::slice::from_ref(&self.shim))
            .map_err(PackageError::FilesystemFailure)?;
        log::debug!(
            "Session {id}: shim added to {} of {} documents",
            summary.documents_modified,
            summary.documents_scanned
        );

        let descriptor = SessionDescriptor {
            session_id: id.to_string(),
            launch_file: self.locate_launch(dir),
            created_at: Utc::now(),
            runtime: SessionRuntime::default(),
        };
        write_descriptor(dir, &descriptor)?;
        Ok(to_session(descriptor, dir))
    }

    /// Launch page from the extracted manifest, falling back to the
    /// candidate search when the manifest is absent or its href is broken.
    fn locate_launch(&self, dir: &Path) -> Option<String> {
        let from_manifest = find_manifest_in_tree(dir).and_then(|manifest_path| {
            let text = fs::read(&manifest_path).ok()?;
            let document = ManifestDocument::parse(&String::from_utf8_lossy(&text)).ok()?;
            let base_dir = manifest_path.parent()?;
            launch::resolve_href(base_dir, document.launch_href()?)
        });

        from_manifest
            .or_else(|| launch::find_launch_file(dir, &self.launch_candidates))
            .map(|path| launch::relative_href(dir, &path))
    }

    pub fn get(&self, id: &str) -> Result<PlayerSession, PackageError> {
        let dir = self.existing_session_dir(id)?;
        let descriptor = read_descriptor(&dir)?;
        Ok(to_session(descriptor, &dir))
    }

    /// All sessions with a readable descriptor, oldest first.
    pub fn list(&self) -> Result<Vec<PlayerSession>, PackageError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.root)?.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_valid_session_id(&name) || !entry.path().is_dir() {
                continue;
            }
            match read_descriptor(&entry.path()) {
                Ok(descriptor) => sessions.push(to_session(descriptor, &entry.path())),
                Err(e) => log::warn!("Skipping session {name}: {e}"),
            }
        }

        sessions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(sessions)
    }

    /// Delete a session directory. Returns false when it was already gone.
    pub fn destroy(&self, id: &str) -> Result<bool, PackageError> {
        let dir = self.session_dir(id)?;
        if !dir.exists() {
            log::debug!("Session {id} already removed");
            return Ok(false);
        }
        fs::remove_dir_all(&dir).map_err(|e| {
            PackageError::FilesystemFailure(format!("Failed to remove session {id}: {e}"))
        })?;
        log::info!("Destroyed session {id}");
        Ok(true)
    }

    /// Map a launch-relative request path to a file inside the session.
    pub fn resolve_file(&self, id: &str, relative_path: &str) -> Result<PathBuf, PackageError> {
        let dir = self.existing_session_dir(id)?;
        let relative = safe_relative_path(relative_path).ok_or_else(|| {
            PackageError::FilesystemFailure(format!(
                "Path escapes session directory: {relative_path}"
            ))
        })?;
        if relative == Path::new(SESSION_DESCRIPTOR) {
            return Err(PackageError::FilesystemFailure(format!(
                "Not a session file: {relative_path}"
            )));
        }

        let path = dir.join(relative);
        if !path.is_file() {
            return Err(PackageError::FilesystemFailure(format!(
                "File not found in session {id}: {relative_path}"
            )));
        }
        Ok(path)
    }

    pub fn load_runtime(&self, id: &str) -> Result<SessionRuntime, PackageError> {
        let dir = self.existing_session_dir(id)?;
        Ok(read_descriptor(&dir)?.runtime)
    }

    pub fn save_runtime(&self, id: &str, runtime: &SessionRuntime) -> Result<(), PackageError> {
        let dir = self.existing_session_dir(id)?;
        let mut descriptor = read_descriptor(&dir)?;
        descriptor.runtime = runtime.clone();
        write_descriptor(&dir, &descriptor)
    }
}

fn to_session(descriptor: SessionDescriptor, dir: &Path) -> PlayerSession {
    PlayerSession {
        session_id: descriptor.session_id,
        directory: dir.to_path_buf(),
        launch_file: descriptor.launch_file,
        created_at: descriptor.created_at,
    }
}

fn read_descriptor(dir: &Path) -> Result<SessionDescriptor, PackageError> {
    let raw = fs::read_to_string(dir.join(SESSION_DESCRIPTOR)).map_err(|e| {
        PackageError::FilesystemFailure(format!("Failed to read session descriptor: {e}"))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| PackageError::FilesystemFailure(format!("Invalid session descriptor: {e}")))
}

fn write_descriptor(dir: &Path, descriptor: &SessionDescriptor) -> Result<(), PackageError> {
    let json = serde_json::to_string_pretty(descriptor).map_err(|e| {
        PackageError::FilesystemFailure(format!("Failed to serialize session descriptor: {e}"))
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(dir.join(SESSION_DESCRIPTOR)).map_err(|e| {
        PackageError::FilesystemFailure(format!("Failed to write session descriptor: {e}"))
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
