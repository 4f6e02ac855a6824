//! Typed errors for the feature pipeline

use thiserror::Error;

/// Errors produced while deriving, encoding or persisting features
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid timestamp {value:?}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown feature column {0:?}")]
    UnknownColumn(String),

    #[error("failed to access pipeline file {path:?}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pipeline file {path:?}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
