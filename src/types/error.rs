//! Error types for locbak

use camino::Utf8PathBuf;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for backup operations
#[derive(Debug, Error)]
pub enum BackupError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error tied to a specific path
    #[error("{path}: {source}")]
    Path {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem returned a name that is not valid UTF-8
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Copy capability failed for one file
    #[error("cannot copy {src} to {dest}: {source}")]
    Copy {
        src: Utf8PathBuf,
        dest: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid run options or unreadable directive file
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source path appeared before any `=>` directive
    #[error("target path must be specified before any source paths")]
    TargetNotSpecified,

    /// Run finished with aggregated per-file or per-directive errors
    #[error("{count} errors")]
    Errors { count: usize, messages: Vec<String> },

    /// Run stopped by an unexpected failure (e.g. the output sink broke)
    #[error("backup interrupted: {0}")]
    Interrupted(String),
}

impl BackupError {
    /// Attach a path to an IO error
    pub fn at(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        BackupError::Path {
            path: path.into(),
            source,
        }
    }

    /// Check if this error ends a whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BackupError::TargetNotSpecified
                | BackupError::Errors { .. }
                | BackupError::Interrupted(_)
                | BackupError::Config(_)
        )
    }

    /// Number of aggregated messages carried by this error
    pub fn error_count(&self) -> usize {
        match self {
            BackupError::Errors { count, .. } => *count,
            _ => 0,
        }
    }
}
