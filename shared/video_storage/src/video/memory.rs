use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{VideoRecord, VideoRepository, VideoStorageError, VideoStorageResult};

/// Process-local video repository
///
/// Used for local development without `DynamoDB` and as the record store in tests.
#[derive(Debug, Default)]
pub struct InMemoryVideoStorage {
    videos: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryVideoStorage {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    /// Whether the repository holds no records
    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoStorage {
    async fn get(&self, id: Uuid) -> VideoStorageResult<Option<VideoRecord>> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn insert(&self, video: &VideoRecord) -> VideoStorageResult<()> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(VideoStorageError::VideoExists(video.id.to_string()));
        }
        videos.insert(video.id, video.clone());
        Ok(())
    }

    async fn update(&self, video: &VideoRecord) -> VideoStorageResult<()> {
        let mut videos = self.videos.write().await;
        let slot = videos
            .get_mut(&video.id)
            .ok_or_else(|| VideoStorageError::VideoNotFound(video.id.to_string()))?;
        *slot = video.clone();
        Ok(())
    }
}
