use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for package analysis, repair and playback.
///
/// Service internals report `String` errors with context; they are mapped
/// into one of these variants at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    #[error("No imsmanifest.xml found in package")]
    MissingManifest,
    #[error("Malformed imsmanifest.xml: {0}")]
    MalformedManifest(String),
    #[error("Archive input unavailable: {0}")]
    MissingArchiveInput(String),
    #[error("No launchable HTML file found in package")]
    UnresolvableLaunchFile,
    #[error("Filesystem error: {0}")]
    FilesystemFailure(String),
    #[error("Invalid player session: {0}")]
    InvalidSession(String),
}

impl PackageError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            PackageError::MissingManifest => "MissingManifest",
            PackageError::MalformedManifest(_) => "MalformedManifest",
            PackageError::MissingArchiveInput(_) => "MissingArchiveInput",
            PackageError::UnresolvableLaunchFile => "UnresolvableLaunchFile",
            PackageError::FilesystemFailure(_) => "FilesystemFailure",
            PackageError::InvalidSession(_) => "InvalidSession",
        }
    }
}

impl From<std::io::Error> for PackageError {
    fn from(error: std::io::Error) -> Self {
        PackageError::FilesystemFailure(error.to_string())
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(error: zip::result::ZipError) -> Self {
        PackageError::FilesystemFailure(format!("ZIP error: {error}"))
    }
}

impl Serialize for PackageError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type PackageResult<T> = Result<T, PackageError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
