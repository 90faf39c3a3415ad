//! File-based source error types.

use crate::files::ReadJsonError;

/// Errors produced while assembling or restoring a file-based source.
#[derive(Debug, thiserror::Error)]
pub enum FileBasedError {
    /// The configured catalog could not be loaded.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] ReadJsonError),

    /// A stream appears more than once in the configured catalog.
    #[error("stream '{0}' is configured more than once in the catalog")]
    DuplicateStream(String),

    /// Saved cursor state did not have the expected shape.
    #[error("invalid state for stream '{stream}': {reason}")]
    InvalidState { stream: String, reason: String },
}
