//! Error types for external media tool operations

use thiserror::Error;

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing or remuxing an upload
#[derive(Error, Debug)]
pub enum MediaError {
    /// `ffprobe` could not be started, timed out or exited non-zero
    #[error("Probe execution error: {0}")]
    ProbeExecutionError(String),

    /// The probe output did not have the expected shape
    #[error("Metadata parse error: {0}")]
    MetadataParseError(String),

    /// The probe output listed no video stream
    #[error("No video stream found")]
    NoStreamError,

    /// `ffmpeg` could not be started, timed out or exited non-zero
    #[error("Remux execution error: {0}")]
    RemuxExecutionError(String),
}
