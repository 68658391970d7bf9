use std::sync::Arc;

use axum::body::Bytes;
use futures::Stream;
use tracing::instrument;
use uuid::Uuid;
use video_storage::{VideoRecord, VideoRepository};

use super::{
    check_content_type, collect, load_owned_record, UploadError, UploadResult, UploadedFile,
};
use crate::assets::ThumbnailStore;
use crate::media_storage::SignedUrlIssuer;

/// Accepted thumbnail types
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Attaches an uploaded image to a video record
pub struct ThumbnailUploader {
    videos: Arc<dyn VideoRepository>,
    store: ThumbnailStore,
    url_issuer: Arc<SignedUrlIssuer>,
}

impl ThumbnailUploader {
    /// Builds the pipeline over its clients
    #[must_use]
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        store: ThumbnailStore,
        url_issuer: Arc<SignedUrlIssuer>,
    ) -> Self {
        Self {
            videos,
            store,
            url_issuer,
        }
    }

    /// Loads the record and checks that `user_id` may change it
    ///
    /// # Errors
    ///
    /// `UploadError::NotFound`, `UploadError::Forbidden` or `UploadError::RecordLookup`
    pub async fn authorize(&self, video_id: Uuid, user_id: Uuid) -> UploadResult<VideoRecord> {
        load_owned_record(self.videos.as_ref(), video_id, user_id).await
    }

    /// Authorizes, then stores the thumbnail
    ///
    /// # Errors
    ///
    /// See [`ThumbnailUploader::authorize`] and [`ThumbnailUploader::attach`]
    pub async fn handle<S>(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        upload: UploadedFile<S>,
    ) -> UploadResult<VideoRecord>
    where
        S: Stream<Item = UploadResult<Bytes>> + Send,
    {
        let record = self.authorize(video_id, user_id).await?;
        self.attach(record, upload).await
    }

    /// Stores the thumbnail and points the authorized `record` at it
    ///
    /// The asset file is removed again when the record update fails.
    ///
    /// # Errors
    ///
    /// - `UploadError::UnsupportedMediaType` unless the part is JPEG or PNG
    /// - `UploadError::MalformedUpload` for an empty or unreadable body
    /// - `UploadError::RecordUpdate` if the record cannot be saved
    /// - `UploadError::Storage` if the video reference cannot be re-signed, by
    ///   which point the record and the asset are already saved
    #[instrument(skip_all, fields(video_id = %record.id, content_type = ?upload.content_type))]
    pub async fn attach<S>(
        &self,
        mut record: VideoRecord,
        upload: UploadedFile<S>,
    ) -> UploadResult<VideoRecord>
    where
        S: Stream<Item = UploadResult<Bytes>> + Send,
    {
        let media_type =
            check_content_type(upload.content_type.as_deref(), THUMBNAIL_CONTENT_TYPES)?;

        let data = collect(upload.body).await?;
        if data.is_empty() {
            return Err(UploadError::MalformedUpload("empty thumbnail".to_string()));
        }

        let stored = self.store.store(&media_type, &data).await?;

        record.thumbnail_url = Some(stored.url.clone());
        record.touch();
        self.videos
            .update(&record)
            .await
            .map_err(UploadError::RecordUpdate)?;
        stored.commit()?;

        tracing::info!(size = data.len(), "Thumbnail uploaded");

        Ok(self.url_issuer.resolve(record).await?)
    }
}
