use axum::http::StatusCode;
use thiserror::Error;
use video_storage::VideoStorageError;

use crate::media::MediaError;
use crate::media_storage::StorageError;
use crate::types::AppError;

/// Everything an upload or a record lookup can fail with
#[derive(Error, Debug)]
pub enum UploadError {
    /// The path segment is not a UUID
    #[error("Invalid video id: {0}")]
    InvalidIdentifier(String),

    /// Missing or invalid bearer credential
    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    /// The caller is not the owner of the record
    #[error("User {user_id} does not own video {video_id}")]
    Forbidden {
        /// Authenticated caller
        user_id: uuid::Uuid,
        /// Record the caller tried to modify
        video_id: uuid::Uuid,
    },

    /// No record with this id
    #[error("Video not found: {0}")]
    NotFound(uuid::Uuid),

    /// The part's content type is not accepted
    #[error("Unsupported media type {declared:?}, expected one of {expected:?}")]
    UnsupportedMediaType {
        /// Content type sent with the part, if any
        declared: Option<String>,
        /// Accepted media types
        expected: &'static [&'static str],
    },

    /// The form or the part could not be read
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    /// The body exceeded the route's limit
    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    /// Probing or remuxing failed
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Writing or signing a blob failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading the record failed
    #[error("Failed to load video record: {0}")]
    RecordLookup(VideoStorageError),

    /// Persisting the record failed
    #[error("Failed to update video record: {0}")]
    RecordUpdate(VideoStorageError),

    /// The scratch file could not be written
    #[error("Failed to write upload to disk: {0}")]
    Scratch(#[from] std::io::Error),
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Convert upload errors to application errors
impl From<UploadError> for AppError {
    #[allow(clippy::cognitive_complexity)]
    fn from(err: UploadError) -> Self {
        use UploadError::{
            Forbidden, InvalidIdentifier, MalformedUpload, Media, NotFound, PayloadTooLarge,
            RecordLookup, RecordUpdate, Scratch, Storage, Unauthenticated, UnsupportedMediaType,
        };

        match &err {
            InvalidIdentifier(_) => {
                tracing::debug!("{err}");
                Self::new(StatusCode::BAD_REQUEST, "invalid_id", "Invalid video id")
            }
            Unauthenticated(reason) => {
                tracing::debug!("Rejected credential: {reason}");
                Self::new(
                    StatusCode::UNAUTHORIZED,
                    "unauthenticated",
                    "Couldn't validate credentials",
                )
            }
            Forbidden { .. } => {
                tracing::info!("{err}");
                Self::new(
                    StatusCode::FORBIDDEN,
                    "forbidden",
                    "Only the owner can upload to this video",
                )
            }
            NotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", "Video not found"),
            UnsupportedMediaType { .. } => {
                tracing::debug!("{err}");
                Self::new(
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "unsupported_media_type",
                    "Unsupported media type",
                )
            }
            MalformedUpload(msg) => {
                tracing::warn!("Malformed upload: {msg}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "malformed_upload",
                    "Couldn't read the uploaded file",
                )
            }
            PayloadTooLarge => Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Upload is too large",
            ),
            Media(MediaError::NoStreamError) => Self::new(
                StatusCode::BAD_REQUEST,
                "no_video_stream",
                "Uploaded file has no video stream",
            ),
            Media(MediaError::MetadataParseError(msg)) => {
                tracing::warn!("Unreadable video metadata: {msg}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "unreadable_video",
                    "Couldn't read the uploaded video",
                )
            }
            Media(
                MediaError::ProbeExecutionError(msg) | MediaError::RemuxExecutionError(msg),
            ) => {
                tracing::error!("Media tool failure: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "media_processing_error",
                    "Couldn't process video",
                )
            }
            Storage(StorageError::SigningError(msg)) => {
                tracing::error!("Signing failure: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "signing_error",
                    "Couldn't generate video URL",
                )
            }
            Storage(StorageError::WriteError(msg)) => {
                tracing::error!("Blob store failure: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Couldn't store upload",
                )
            }
            RecordLookup(e) | RecordUpdate(e) => {
                tracing::error!("Video record failure: {e}");
                Self::internal()
            }
            Scratch(e) => {
                tracing::error!("Scratch file failure: {e}");
                Self::internal()
            }
        }
    }
}
