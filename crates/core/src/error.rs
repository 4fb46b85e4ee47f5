// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced at the raw file boundary.
///
/// The sentinel readers in [`crate::reader`] never surface these; they are
/// returned by the `try_*` variants so callers can decide how to degrade.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading file: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl ReadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, err: &serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// A missing file is the normal "nothing recorded yet" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// The one failure the aggregation layer reports outward.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),
}
