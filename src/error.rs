//! Error handling module for the plugin packager
//!
//! Every step of the packaging pipeline is a hard precondition for the next,
//! so errors are never recovered from internally. They propagate to `main`,
//! which maps them to an exit code with [`PackagerError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

use crate::label::LabelAttemptError;

/// Main error type for the packager
#[derive(Error, Debug)]
pub enum PackagerError {
    /// A required input file does not exist (e.g. `Build.version`)
    #[error("Required file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The engine version descriptor lacks a usable integer field
    #[error("Version field '{field}' is missing or not an integer in {}", path.display())]
    MissingVersionField { field: &'static str, path: PathBuf },

    /// The selected manifest template does not exist
    #[error("Manifest template not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// The manifest template parsed but is not a key-value document
    #[error("Manifest template {} is not a JSON object", path.display())]
    InvalidManifest { path: PathBuf },

    /// A prerequisite directory or tool is missing before work starts
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Every version-label strategy failed
    #[error("Could not resolve a version label for '{revision}': {}", format_attempts(attempts))]
    VersionLabel {
        revision: String,
        attempts: Vec<LabelAttemptError>,
    },

    /// A git query exited unsuccessfully
    #[error("Git query failed: {0}")]
    Git(String),

    /// The engine build tool exited with a non-zero status
    #[error("Build tool failed with exit code {code}")]
    BuildFailed { code: i32 },

    /// The archiver exited with a non-zero status
    #[error("Archiver failed with exit code {code}")]
    ArchiveFailed { code: i32 },

    /// A subprocess could not be started at all
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// IO errors (directory creation, file writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for packager operations
pub type Result<T> = std::result::Result<T, PackagerError>;

fn format_attempts(attempts: &[LabelAttemptError]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PackagerError {
    /// Create a prerequisite error
    pub fn prerequisite(msg: impl Into<String>) -> Self {
        Self::MissingPrerequisite(msg.into())
    }

    /// Create a git query error
    pub fn git(msg: impl Into<String>) -> Self {
        Self::Git(msg.into())
    }

    /// Process exit code for this error.
    ///
    /// A failed build passes the build tool's own status through unchanged;
    /// everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BuildFailed { code } => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelStrategy;

    #[test]
    fn test_error_display() {
        let err = PackagerError::git("git rev-parse exited with 128");
        assert_eq!(err.to_string(), "Git query failed: git rev-parse exited with 128");

        let err = PackagerError::MissingVersionField {
            field: "MinorVersion",
            path: PathBuf::from("Build.version"),
        };
        assert_eq!(
            err.to_string(),
            "Version field 'MinorVersion' is missing or not an integer in Build.version"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "exists");
        let err: PackagerError = io_err.into();
        assert!(matches!(err, PackagerError::Io(_)));
    }

    #[test]
    fn test_exit_code_passes_build_status_through() {
        assert_eq!(PackagerError::BuildFailed { code: 3 }.exit_code(), 3);
        assert_eq!(PackagerError::BuildFailed { code: 25 }.exit_code(), 25);
        assert_eq!(PackagerError::ArchiveFailed { code: 3 }.exit_code(), 1);
        assert_eq!(PackagerError::prerequisite("ThirdParty").exit_code(), 1);
    }

    #[test]
    fn test_version_label_lists_every_attempt() {
        let err = PackagerError::VersionLabel {
            revision: "HEAD".to_string(),
            attempts: vec![
                LabelAttemptError::new(LabelStrategy::Describe, "no names found"),
                LabelAttemptError::new(LabelStrategy::ShortHash, "not a git repository"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("describe: no names found"));
        assert!(msg.contains("rev-parse: not a git repository"));
    }
}
