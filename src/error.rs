//! Error types for configuration, fetching and writing.
//!
//! [`RunError`] ends a run. [`Absence`] is the ordinary
//! "this source had nothing for us" outcome of a single fetch attempt and is
//! always contained by the pipeline.

use thiserror::Error;

/// Invalid configuration detected before any network request is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target date override {value:?} from {source_name} (expected YYYYMMDD)")]
    InvalidTargetDate { source_name: String, value: String },

    #[error("invalid source host {value:?}: {reason}")]
    InvalidHost { value: String, reason: String },
}

/// Why a single fetch attempt produced no payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Absence {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("empty body")]
    EmptyBody,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure to persist an output artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output directory {path} is not writable: {source}")]
    NotWritable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Any error that ends a run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl RunError {
    /// Process exit code for this failure: 2 for configuration, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => 2,
            RunError::Write(_) | RunError::HttpClient(_) => 1,
        }
    }
}
