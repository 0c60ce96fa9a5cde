use std::path::PathBuf;
use thiserror::Error;

/// Result type for change operations
pub type Result<T> = std::result::Result<T, ChangeError>;

/// Errors that can occur while applying a single proposal
#[derive(Error, Debug)]
pub enum ChangeError {
    /// Proposal named no usable path
    #[error("Empty target path")]
    EmptyPath,

    /// Proposal path resolves outside the working tree
    #[error("Path escapes working tree: {0}")]
    PathEscapesRoot(String),

    /// Target exists but is not a regular file
    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Existing file could not be copied to its backup
    #[error("Backup of {} failed: {source}", .path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading, writing or renaming failed
    #[error("{action} {} failed: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChangeError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
