//! S3-based video storage operations
mod clock;
mod error;
pub mod reference;
mod signer;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, primitives::ByteStream, Client as S3Client};
use chrono::{DateTime, Utc};

pub use clock::{Clock, SystemClock};
pub use error::{StorageError, StorageResult};
pub use reference::BlobReference;
pub use signer::SignedUrlIssuer;

/// Time-limited URL granting read access to a private object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// The presigned GET URL
    pub url: String,
    /// Instant after which the blob store rejects the URL
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    /// Whether the URL still authenticates at `now`
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Object storage the video uploads are written to
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket new objects are written to
    fn bucket(&self) -> &str;

    /// Uploads the file at `path` under `key`
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// Presigns a GET for `reference`, valid from `issued_at` for `ttl`
    async fn presign_get(
        &self,
        reference: &BlobReference,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> StorageResult<SignedUrl>;

    /// Direct, unsigned link to `key` in the configured bucket
    fn public_url(&self, key: &str) -> String;
}

/// Media storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    region: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for video storage
    /// * `region` - AWS region of the bucket, used for public links
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, region: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            region,
        }
    }
}

#[async_trait]
impl BlobStore for MediaStorage {
    fn bucket(&self) -> &str {
        &self.bucket_name
    }

    /// Streams the file from disk into a single `PutObject` call
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WriteError` if the file cannot be read or S3 rejects the upload
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::WriteError(format!("Failed to open upload: {e}")))?;

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await?;

        tracing::debug!(bucket = %self.bucket_name, key, "Uploaded object");
        Ok(())
    }

    /// Generates a SigV4 presigned GET URL
    ///
    /// The signature embeds `issued_at` and the expiry window, so the URL stops
    /// authenticating at `issued_at + ttl` regardless of caching.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SigningError` if the presigning config is invalid or signing fails
    async fn presign_get(
        &self,
        reference: &BlobReference,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> StorageResult<SignedUrl> {
        let presigned_config = PresigningConfig::builder()
            .start_time(SystemTime::from(issued_at))
            .expires_in(ttl)
            .build()
            .map_err(|e| {
                StorageError::SigningError(format!("Failed to create presigning config: {e}"))
            })?;

        let presigned_request = self
            .s3_client
            .get_object()
            .bucket(&reference.bucket)
            .key(&reference.key)
            .presigned(presigned_config)
            .await
            .map_err(|e| StorageError::SigningError(format!("Failed to presign URL: {e}")))?;

        Ok(SignedUrl {
            url: presigned_request.uri().to_string(),
            expires_at: issued_at + ttl,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket_name,
            self.region,
            key.trim_start_matches('/')
        )
    }
}
