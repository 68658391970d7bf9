//! Application context shared by every request

use std::sync::Arc;

use video_storage::VideoRepository;

use crate::assets::ThumbnailStore;
use crate::jwt::JwtManager;
use crate::media::MediaTools;
use crate::media_storage::{BlobStore, Clock, SignedUrlIssuer};
use crate::types::AppConfig;
use crate::upload::{ThumbnailUploader, VideoUploader};

/// Clients and services built once at startup
///
/// Every field is immutable or internally synchronized; handlers receive the
/// pieces they need as `Extension`s.
#[derive(Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Arc<AppConfig>,
    /// Access token validation
    pub jwt_manager: Arc<JwtManager>,
    /// Video record repository
    pub videos: Arc<dyn VideoRepository>,
    /// Signs stored blob references on read
    pub url_issuer: Arc<SignedUrlIssuer>,
    /// Thumbnail upload pipeline
    pub thumbnail_uploader: Arc<ThumbnailUploader>,
    /// Video upload pipeline
    pub video_uploader: Arc<VideoUploader>,
}

impl AppContext {
    /// Wires the uploaders and the URL issuer over the given clients
    #[must_use]
    pub fn new(
        config: AppConfig,
        videos: Arc<dyn VideoRepository>,
        blob_store: Arc<dyn BlobStore>,
        media_tools: Arc<dyn MediaTools>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let jwt_manager = Arc::new(JwtManager::new(&config.jwt_secret));
        let url_issuer = Arc::new(SignedUrlIssuer::new(
            blob_store.clone(),
            clock,
            config.signed_url_ttl,
        ));

        let thumbnail_uploader = Arc::new(ThumbnailUploader::new(
            videos.clone(),
            ThumbnailStore::new(config.thumbnail_strategy.clone()),
            url_issuer.clone(),
        ));
        let video_uploader = Arc::new(VideoUploader::new(
            videos.clone(),
            blob_store,
            media_tools,
            url_issuer.clone(),
            config.video_url_strategy,
            config.scratch_dir.clone(),
        ));

        Self {
            config: Arc::new(config),
            jwt_manager,
            videos,
            url_issuer,
            thumbnail_uploader,
            video_uploader,
        }
    }
}
