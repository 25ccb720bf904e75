//! Error types for graph analytics.
//!
//! Only contract violations are errors. Data-shape problems inside a payload
//! (a link to a missing node, a duplicated id) are recorded in the
//! [`LoadReport`](crate::LoadReport) and never abort a load.

use atlas_core::PayloadError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// A call was made with an out-of-contract argument.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Centrality options could not be decoded.
    #[error("invalid centrality options: {0}")]
    InvalidOptions(String),

    /// The options decode but the chosen algorithm cannot honour them.
    #[error("{algorithm} does not support {reason}")]
    UnsupportedOption {
        algorithm: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("config error in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn unsupported(algorithm: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOption {
            algorithm,
            reason: reason.into(),
        }
    }

    pub fn config(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
