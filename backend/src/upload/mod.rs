//! Thumbnail and video upload orchestration
//!
//! Both uploaders run the same gates before touching the body: the record must
//! exist, belong to the caller and the declared content type must be allowed.

mod error;
mod scoped;
mod thumbnail;
mod video;

use axum::body::Bytes;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use futures::{Stream, TryStreamExt};
use mime::Mime;
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;
use video_storage::{VideoRecord, VideoRepository};

pub use error::{UploadError, UploadResult};
pub use scoped::ScopedFile;
pub use thumbnail::{ThumbnailUploader, THUMBNAIL_CONTENT_TYPES};
pub use video::{VideoUploader, VIDEO_CONTENT_TYPES};

/// Number of random bytes behind every generated object or file name
const KEY_BYTES: usize = 32;

/// Multipart file part handed to an uploader
pub struct UploadedFile<S> {
    /// `Content-Type` of the part, as sent by the client
    pub content_type: Option<String>,
    /// Part contents
    pub body: S,
}

impl<S> UploadedFile<S>
where
    S: Stream<Item = UploadResult<Bytes>> + Send,
{
    /// Wraps a part's content type and body
    pub const fn new(content_type: Option<String>, body: S) -> Self {
        Self { content_type, body }
    }
}

/// Unpadded base64url of 32 bytes from the OS generator
#[must_use]
pub fn random_key() -> String {
    let mut bytes = [0_u8; KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Parses `declared` and checks its essence against `allowed`
///
/// Parameters such as `; charset=binary` are ignored.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedMediaType` for a missing, unparseable or disallowed type
pub fn check_content_type(
    declared: Option<&str>,
    allowed: &'static [&'static str],
) -> UploadResult<Mime> {
    let unsupported = || UploadError::UnsupportedMediaType {
        declared: declared.map(ToString::to_string),
        expected: allowed,
    };

    let media_type: Mime = declared
        .ok_or_else(unsupported)?
        .parse()
        .map_err(|_| unsupported())?;

    if allowed.contains(&media_type.essence_str()) {
        Ok(media_type)
    } else {
        Err(unsupported())
    }
}

/// Loads `video_id` and checks that `user_id` owns it
///
/// # Errors
///
/// - `UploadError::NotFound` if no such record exists
/// - `UploadError::Forbidden` if it belongs to someone else
/// - `UploadError::RecordLookup` if the repository fails
pub async fn load_owned_record(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> UploadResult<VideoRecord> {
    let record = videos
        .get(video_id)
        .await
        .map_err(UploadError::RecordLookup)?
        .ok_or(UploadError::NotFound(video_id))?;

    if !record.is_owned_by(user_id) {
        return Err(UploadError::Forbidden { user_id, video_id });
    }

    Ok(record)
}

/// Reads a whole body into memory
async fn collect<S>(body: S) -> UploadResult<Vec<u8>>
where
    S: Stream<Item = UploadResult<Bytes>> + Send,
{
    body.try_fold(Vec::new(), |mut acc, chunk| async move {
        acc.extend_from_slice(&chunk);
        Ok(acc)
    })
    .await
}
