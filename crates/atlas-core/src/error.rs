//! Error types for payload decoding.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for payload operations.
pub type Result<T> = std::result::Result<T, PayloadError>;

/// Errors that can occur while decoding a node-link payload.
///
/// Only whole-document problems are errors. A single bad link is not: it is
/// carried through as a malformed [`Endpoint`](crate::Endpoint) and dropped
/// later by the graph builder.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("failed to read payload {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid payload JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PayloadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
