use std::path::PathBuf;

use thiserror::Error;

use crate::value::Kind;

#[derive(Debug, Error)]
pub enum EnvfigError {
    #[error("Please rename {key} to {replacement} in your environment")]
    DeprecatedKey {
        key: String,
        replacement: String,
    },

    #[error("Invalid value for '{key}': {raw:?} ({reason})")]
    InvalidValue {
        key: String,
        raw: String,
        reason: String,
    },

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: Kind,
        found: Kind,
    },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to persist configuration ({} file(s) failed)", .0.len())]
    SyncFailed(Vec<EnvfigError>),

    #[error("Failed to parse comments file {path}: {source}")]
    CommentsParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl EnvfigError {
    /// Errors that must stop startup rather than be reported and retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EnvfigError::DeprecatedKey { .. } | EnvfigError::InvalidValue { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnvfigError::IoError {
            path: path.into(),
            source,
        }
    }
}
