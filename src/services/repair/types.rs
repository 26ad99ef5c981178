use crate::types::PackageError;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one repair run. `repairs` is in the order fixes were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    pub success: bool,
    pub repairs: Vec<String>,
    pub launch_file: Option<String>,
    pub warnings: Vec<String>,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl RepairReport {
    pub fn failed(error: &PackageError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

/// Applied fixes and degradations collected while repairing.
#[derive(Debug, Default)]
pub(crate) struct RepairLog {
    pub repairs: Vec<String>,
    pub warnings: Vec<String>,
}

impl RepairLog {
    pub fn fixed(&mut self, message: String) {
        log::info!("Repair: {message}");
        self.repairs.push(message);
    }

    pub fn warn(&mut self, message: String) {
        log::warn!("Repair warning: {message}");
        self.warnings.push(message);
    }
}
