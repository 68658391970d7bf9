use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    jwt::{JwtManager, TOKEN_EXPIRATION},
    media_storage::Clock,
    server,
    state::AppContext,
    testing::{FakeMediaTools, FixedClock, MemoryBlobStore},
    types::{AppConfig, Environment, ThumbnailStrategy, VideoStoreKind, VideoUrlStrategy},
};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;
use video_storage::{InMemoryVideoStorage, VideoRecord, VideoRepository};

use super::{multipart_body, multipart_content_type};

pub const TEST_BUCKET: &str = "tubely-videos";
pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_BASE_URL: &str = "http://localhost:8091";

/// Setup test logging
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Which thumbnail strategy the router under test uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailMode {
    Disk,
    DataUrl,
}

/// Router over in-memory fakes plus handles to inspect them
pub struct TestSetup {
    pub router: Router,
    pub videos: Arc<InMemoryVideoStorage>,
    pub blob_store: Arc<MemoryBlobStore>,
    pub media_tools: Arc<FakeMediaTools>,
    pub clock: Arc<FixedClock>,
    pub scratch_dir: TempDir,
    pub assets_dir: TempDir,
}

pub struct TestSetupBuilder {
    media_tools: FakeMediaTools,
    blob_store: MemoryBlobStore,
    thumbnail_mode: ThumbnailMode,
    video_url_strategy: VideoUrlStrategy,
}

impl TestSetupBuilder {
    pub fn media_tools(mut self, media_tools: FakeMediaTools) -> Self {
        self.media_tools = media_tools;
        self
    }

    pub fn probe(self, width: u32, height: u32) -> Self {
        self.media_tools(FakeMediaTools::with_probe_json(&super::probe_json(
            width, height,
        )))
    }

    pub fn blob_store(mut self, blob_store: MemoryBlobStore) -> Self {
        self.blob_store = blob_store;
        self
    }

    pub const fn thumbnail_mode(mut self, thumbnail_mode: ThumbnailMode) -> Self {
        self.thumbnail_mode = thumbnail_mode;
        self
    }

    pub const fn video_url_strategy(mut self, video_url_strategy: VideoUrlStrategy) -> Self {
        self.video_url_strategy = video_url_strategy;
        self
    }

    pub fn build(self) -> TestSetup {
        setup_test_env();

        let scratch_dir = tempfile::tempdir().unwrap();
        let assets_dir = tempfile::tempdir().unwrap();

        let thumbnail_strategy = match self.thumbnail_mode {
            ThumbnailMode::Disk => ThumbnailStrategy::Disk {
                assets_root: assets_dir.path().to_path_buf(),
                public_base_url: TEST_BASE_URL.to_string(),
            },
            ThumbnailMode::DataUrl => ThumbnailStrategy::DataUrl,
        };

        let config = AppConfig {
            bucket: TEST_BUCKET.to_string(),
            region: "us-east-1".to_string(),
            port: 0,
            jwt_secret: TEST_SECRET.to_string(),
            thumbnail_strategy,
            video_url_strategy: self.video_url_strategy,
            video_store: VideoStoreKind::Memory,
            videos_table_name: "videos".to_string(),
            scratch_dir: scratch_dir.path().to_path_buf(),
            signed_url_ttl: Duration::from_secs(5 * 60),
            media_tool_timeout: Duration::from_secs(5),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
        };

        let videos = Arc::new(InMemoryVideoStorage::new());
        let blob_store = Arc::new(self.blob_store);
        let media_tools = Arc::new(self.media_tools);
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));

        let context = AppContext::new(
            config,
            videos.clone(),
            blob_store.clone(),
            media_tools.clone(),
            clock.clone(),
        );
        let router = server::router(
            Environment::Development {
                presign_expiry_override: None,
            },
            &context,
        );

        TestSetup {
            router,
            videos,
            blob_store,
            media_tools,
            clock,
            scratch_dir,
            assets_dir,
        }
    }
}

impl TestSetup {
    pub fn builder() -> TestSetupBuilder {
        TestSetupBuilder {
            media_tools: FakeMediaTools::landscape(),
            blob_store: MemoryBlobStore::new(TEST_BUCKET),
            thumbnail_mode: ThumbnailMode::Disk,
            video_url_strategy: VideoUrlStrategy::Signed,
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Inserts a fresh record owned by `owner`
    pub async fn seed_video(&self, owner: Uuid) -> VideoRecord {
        let record = VideoRecord::new(owner, "Boots", "A video about boots");
        self.videos.insert(&record).await.unwrap();
        record
    }

    pub async fn stored_video(&self, id: Uuid) -> VideoRecord {
        self.videos.get(id).await.unwrap().unwrap()
    }

    /// Bearer token for `user_id` signed with the router's secret
    pub fn token_for(user_id: Uuid) -> String {
        JwtManager::new(TEST_SECRET)
            .issue_token(user_id, TOKEN_EXPIRATION)
            .unwrap()
    }

    /// Unix timestamp at which URLs signed right now expire
    pub fn clock_now_plus_ttl(&self) -> i64 {
        (self.clock.now() + Duration::from_secs(5 * 60)).timestamp()
    }

    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path()).unwrap().count()
    }

    pub fn asset_entries(&self) -> usize {
        std::fs::read_dir(self.assets_dir.path()).unwrap().count()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_get(&self, route: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("GET");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Posts a single-part multipart upload
    pub async fn send_upload(
        &self,
        route: &str,
        token: Option<&str>,
        field: &str,
        content_type: &str,
        data: &[u8],
    ) -> Response {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", multipart_content_type());
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let body = multipart_body(field, "upload.bin", content_type, data);
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}
