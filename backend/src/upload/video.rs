use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use futures::Stream;
use tracing::instrument;
use uuid::Uuid;
use video_storage::{VideoRecord, VideoRepository};

use super::{
    check_content_type, load_owned_record, random_key, ScopedFile, UploadError, UploadResult,
    UploadedFile,
};
use crate::media::{ContainerNormalizer, MediaInspector, MediaTools};
use crate::media_storage::{reference, BlobStore, SignedUrlIssuer};
use crate::types::VideoUrlStrategy;

/// Accepted video types
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// Content type objects are stored with
const STORED_CONTENT_TYPE: &str = "video/mp4";

/// Takes an uploaded video through probing, remuxing and the blob store
pub struct VideoUploader {
    videos: Arc<dyn VideoRepository>,
    blob_store: Arc<dyn BlobStore>,
    inspector: MediaInspector,
    normalizer: ContainerNormalizer,
    url_issuer: Arc<SignedUrlIssuer>,
    url_strategy: VideoUrlStrategy,
    scratch_dir: PathBuf,
}

impl VideoUploader {
    /// Builds the pipeline over its clients
    #[must_use]
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        blob_store: Arc<dyn BlobStore>,
        media_tools: Arc<dyn MediaTools>,
        url_issuer: Arc<SignedUrlIssuer>,
        url_strategy: VideoUrlStrategy,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            videos,
            blob_store,
            inspector: MediaInspector::new(media_tools.clone()),
            normalizer: ContainerNormalizer::new(media_tools),
            url_issuer,
            url_strategy,
            scratch_dir,
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

    /// Authorizes, then stores the video
    ///
    /// # Errors
    ///
    /// See [`VideoUploader::authorize`] and [`VideoUploader::attach`]
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

    /// Stores the video and points the authorized `record` at it
    ///
    /// Both the raw upload and its remuxed copy live in the scratch directory
    /// only for the duration of this call.
    ///
    /// # Errors
    ///
    /// - `UploadError::UnsupportedMediaType` unless the part is `video/mp4`
    /// - `UploadError::MalformedUpload` for an empty or unreadable body
    /// - `UploadError::Media` if probing or remuxing fails
    /// - `UploadError::Storage` if the blob store write or URL signing fails
    /// - `UploadError::RecordUpdate` if the record cannot be saved
    #[instrument(skip_all, fields(video_id = %record.id, content_type = ?upload.content_type))]
    pub async fn attach<S>(
        &self,
        mut record: VideoRecord,
        upload: UploadedFile<S>,
    ) -> UploadResult<VideoRecord>
    where
        S: Stream<Item = UploadResult<Bytes>> + Send,
    {
        check_content_type(upload.content_type.as_deref(), VIDEO_CONTENT_TYPES)?;

        let (raw, size) = ScopedFile::from_stream(&self.scratch_dir, ".mp4", upload.body).await?;
        if size == 0 {
            return Err(UploadError::MalformedUpload("empty video".to_string()));
        }

        let aspect = self.inspector.inspect(raw.path()).await?;

        let processed = ScopedFile::guard(ContainerNormalizer::output_path(raw.path()));
        self.normalizer.normalize(raw.path()).await?;

        let key = format!("{}{}.mp4", aspect.key_prefix(), random_key());
        self.blob_store
            .put_file(&key, processed.path(), STORED_CONTENT_TYPE)
            .await?;

        let video_url = match self.url_strategy {
            VideoUrlStrategy::Signed => reference::encode(self.blob_store.bucket(), &key),
            VideoUrlStrategy::Public => self.blob_store.public_url(&key),
        };

        record.video_url = Some(video_url);
        record.touch();
        self.videos
            .update(&record)
            .await
            .map_err(UploadError::RecordUpdate)?;

        tracing::info!(%aspect, size, %key, "Video uploaded");

        Ok(self.url_issuer.resolve(record).await?)
    }
}
