use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failure cases that can occur around the conversion
/// pipeline: reading input files, writing the JSON envelope, and wiring up the
/// command line. Findings produced by the pipeline itself are not Rust errors;
/// they travel as [`ValidationError`](crate::model::ValidationError) values
/// inside the result envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization of the result envelope fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a conversion finishes without producing usable data.
    #[error("conversion failed with {0} error(s)")]
    ConversionFailed(usize),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
