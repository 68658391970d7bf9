//! Video record and upload handlers

use std::sync::Arc;

use axum::{Extension, Json};
use futures::TryStreamExt;
use tracing::instrument;
use video_storage::{VideoRecord, VideoRepository};

use crate::{
    media_storage::SignedUrlIssuer,
    middleware::AuthenticatedUser,
    types::{multipart_error, AppError, UploadForm, VideoId},
    upload::{ThumbnailUploader, UploadError, UploadedFile, VideoUploader},
};

/// Multipart field carrying the thumbnail image
const THUMBNAIL_FIELD: &str = "thumbnail";

/// Multipart field carrying the video file
const VIDEO_FIELD: &str = "video";

/// Uploads a thumbnail for a video
///
/// Expects a `multipart/form-data` body with a `thumbnail` part of type
/// `image/jpeg` or `image/png`. Only the owner of the video may upload.
///
/// # Errors
///
/// - 400 for a malformed id or upload
/// - 401 without a valid bearer token
/// - 403 when the caller does not own the video
/// - 404 when the video does not exist
/// - 413 above the thumbnail size limit
/// - 415 for any other image type
#[instrument(skip(uploader, form), fields(user_id = %user.user_id))]
pub async fn upload_thumbnail(
    VideoId(video_id): VideoId,
    user: AuthenticatedUser,
    Extension(uploader): Extension<Arc<ThumbnailUploader>>,
    form: UploadForm,
) -> Result<Json<VideoRecord>, AppError> {
    let record = uploader.authorize(video_id, user.user_id).await?;
    let mut multipart = form.into_multipart()?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let upload = UploadedFile::new(
            field.content_type().map(ToString::to_string),
            field.map_err(multipart_error),
        );
        let updated = uploader.attach(record, upload).await?;
        return Ok(Json(updated));
    }

    Err(UploadError::MalformedUpload(format!("missing `{THUMBNAIL_FIELD}` field")).into())
}

/// Uploads the video file of a video
///
/// Expects a `multipart/form-data` body with a `video` part of type `video/mp4`.
/// The file is probed for its aspect ratio, remuxed for fast start and stored
/// privately; the response carries a short-lived signed URL.
///
/// # Errors
///
/// - 400 for a malformed id or upload, or a file without a video stream
/// - 401 without a valid bearer token
/// - 403 when the caller does not own the video
/// - 404 when the video does not exist
/// - 413 above the video size limit
/// - 415 for anything but `video/mp4`
/// - 500 when probing, remuxing, storing or signing fails
#[instrument(skip(uploader, form), fields(user_id = %user.user_id))]
pub async fn upload_video(
    VideoId(video_id): VideoId,
    user: AuthenticatedUser,
    Extension(uploader): Extension<Arc<VideoUploader>>,
    form: UploadForm,
) -> Result<Json<VideoRecord>, AppError> {
    let record = uploader.authorize(video_id, user.user_id).await?;
    let mut multipart = form.into_multipart()?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let upload = UploadedFile::new(
            field.content_type().map(ToString::to_string),
            field.map_err(multipart_error),
        );
        let updated = uploader.attach(record, upload).await?;
        return Ok(Json(updated));
    }

    Err(UploadError::MalformedUpload(format!("missing `{VIDEO_FIELD}` field")).into())
}

/// Fetches a video record
///
/// A stored `bucket,key` video reference is replaced by a signed URL issued
/// for this response.
///
/// # Errors
///
/// - 400 for a malformed id
/// - 401 without a valid bearer token
/// - 404 when the video does not exist
#[instrument(skip(videos, url_issuer), fields(user_id = %user.user_id))]
pub async fn get_video(
    VideoId(video_id): VideoId,
    user: AuthenticatedUser,
    Extension(videos): Extension<Arc<dyn VideoRepository>>,
    Extension(url_issuer): Extension<Arc<SignedUrlIssuer>>,
) -> Result<Json<VideoRecord>, AppError> {
    let record = videos
        .get(video_id)
        .await
        .map_err(UploadError::RecordLookup)?
        .ok_or(UploadError::NotFound(video_id))?;

    let resolved = url_issuer
        .resolve(record)
        .await
        .map_err(UploadError::from)?;

    Ok(Json(resolved))
}
