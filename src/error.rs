//! Error types for refgraph.
//!
//! Only operation-level failures live here: a missing root, a missing or
//! malformed snapshot, an unknown node. Per-file problems (unreadable or
//! unparsable content) are logged where they happen and never surface as
//! a `GraphError`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for refgraph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    /// The requested project root does not exist.
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No snapshot has been written yet.
    #[error("no graph snapshot at {}", .0.display())]
    SnapshotNotFound(PathBuf),

    /// A node id that is not part of the current snapshot.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl GraphError {
    /// Machine-readable category used in [`ErrorPayload`].
    pub fn kind(&self) -> &'static str {
        match self {
            GraphError::NotFound(_) | GraphError::SnapshotNotFound(_) | GraphError::UnknownNode(_) => {
                "not_found"
            }
            GraphError::Io(_) => "io",
            GraphError::Json(_) => "invalid_snapshot",
            GraphError::Config(_) => "config",
            GraphError::Parse(_) => "parse",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == "not_found"
    }
}

/// Structured failure handed to callers of the query surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

impl From<&GraphError> for ErrorPayload {
    fn from(err: &GraphError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
