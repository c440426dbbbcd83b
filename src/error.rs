//! Error types for the report pipeline.
//!
//! Only image handling can abort a build: an upload that cannot be decoded
//! is fatal and no artifact is produced. Everything else in the pipeline is
//! total — an unparseable description flattens to an empty block sequence,
//! and remote upload failures are logged without touching the build result.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Failures that abort a report build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// An uploaded file could not be decoded or re-encoded as an image.
    #[error("invalid image '{name}': {source}")]
    InvalidImage {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// An upload source could not be read or parsed into raw bytes.
    #[error("invalid upload '{name}': {reason}")]
    InvalidUpload { name: String, reason: String },

    /// Malformed request document.
    #[error("malformed request: {0}")]
    Request(#[from] serde_json::Error),

    /// IO error from the request store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF serialization error.
    #[error("PDF output error: {0}")]
    Pdf(String),
}
