use std::sync::Arc;
use std::time::Duration;

use video_storage::VideoRecord;

use super::{reference, BlobReference, BlobStore, Clock, SignedUrl, StorageResult};

/// Issues signed retrieval URLs for blob references
///
/// Nothing is cached: every call signs against the clock's current time, so a
/// returned URL is only ever as old as the request that produced it.
pub struct SignedUrlIssuer {
    blob_store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SignedUrlIssuer {
    /// Issuer signing through `blob_store`, valid for `ttl` from `clock`'s now
    #[must_use]
    pub fn new(blob_store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            blob_store,
            clock,
            ttl,
        }
    }

    /// Signs `reference` with the configured ttl
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SigningError` if the blob store cannot sign the request
    pub async fn issue(&self, reference: &BlobReference) -> StorageResult<SignedUrl> {
        self.issue_with_ttl(reference, self.ttl).await
    }

    /// Signs `reference`, valid until now + `ttl`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SigningError` if the blob store cannot sign the request
    pub async fn issue_with_ttl(
        &self,
        reference: &BlobReference,
        ttl: Duration,
    ) -> StorageResult<SignedUrl> {
        self.blob_store
            .presign_get(reference, self.clock.now(), ttl)
            .await
    }

    /// Replaces a stored `bucket,key` video URL with a freshly signed one
    ///
    /// Plain URLs and records without a video are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SigningError` if signing fails
    pub async fn resolve(&self, mut video: VideoRecord) -> StorageResult<VideoRecord> {
        let Some(reference) = video.video_url.as_deref().and_then(reference::decode) else {
            return Ok(video);
        };

        let signed = self.issue(&reference).await?;
        video.video_url = Some(signed.url);
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::testing::{FixedClock, MemoryBlobStore};

    fn issuer(clock: Arc<FixedClock>) -> SignedUrlIssuer {
        SignedUrlIssuer::new(
            Arc::new(MemoryBlobStore::new("tubely-videos")),
            clock,
            Duration::from_secs(5 * 60),
        )
    }

    #[tokio::test]
    async fn test_signed_url_rejected_after_ttl() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        ));
        let issuer = issuer(clock.clone());

        let signed = issuer
            .issue(&BlobReference::new("tubely-videos", "/landscape/a.mp4"))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(4 * 60));
        assert!(signed.is_valid_at(clock.now()));

        clock.advance(Duration::from_secs(2 * 60));
        assert!(!signed.is_valid_at(clock.now()));
    }

    #[tokio::test]
    async fn test_every_issue_signs_against_current_time() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let issuer = issuer(clock.clone());
        let reference = BlobReference::new("tubely-videos", "/portrait/b.mp4");

        let first = issuer.issue(&reference).await.unwrap();
        clock.advance(Duration::from_secs(60));
        let second = issuer.issue(&reference).await.unwrap();

        assert_ne!(first.url, second.url);
        assert_eq!(
            second.expires_at - first.expires_at,
            chrono::Duration::seconds(60)
        );
    }

    #[tokio::test]
    async fn test_resolve_signs_blob_references() {
        let issuer = issuer(Arc::new(FixedClock::new(Utc::now())));
        let mut video = VideoRecord::new(Uuid::new_v4(), "", "");
        video.video_url = Some("tubely-videos,/landscape/a.mp4".to_string());

        let resolved = issuer.resolve(video).await.unwrap();

        let url = resolved.video_url.unwrap();
        assert!(url.starts_with("https://tubely-videos.blob.test/landscape/a.mp4?"));
    }

    #[tokio::test]
    async fn test_resolve_passes_plain_urls_through() {
        let issuer = issuer(Arc::new(FixedClock::new(Utc::now())));
        let mut video = VideoRecord::new(Uuid::new_v4(), "", "");
        video.video_url = Some("https://cdn.example.com/video.mp4".to_string());

        let resolved = issuer.resolve(video.clone()).await.unwrap();
        assert_eq!(resolved, video);

        let empty = VideoRecord::new(Uuid::new_v4(), "", "");
        let resolved = issuer.resolve(empty.clone()).await.unwrap();
        assert_eq!(resolved, empty);
    }
}
