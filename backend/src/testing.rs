//! In-process stand-ins for the clock, the blob store and the media tools

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::media::{MediaError, MediaResult, MediaTools};
use crate::media_storage::{
    BlobReference, BlobStore, Clock, SignedUrl, StorageError, StorageResult,
};

/// Clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Clock frozen at `now`
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Stored object in a [`MemoryBlobStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object contents
    pub body: Vec<u8>,
    /// Content type it was written with
    pub content_type: String,
}

/// Blob store keeping objects in memory
#[derive(Debug)]
pub struct MemoryBlobStore {
    bucket: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_writes: bool,
    fail_signing: bool,
}

impl MemoryBlobStore {
    /// Empty store for `bucket`
    #[must_use]
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(HashMap::new()),
            fail_writes: false,
            fail_signing: false,
        }
    }

    /// Every `put_file` fails with a write error
    #[must_use]
    pub const fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Every presign fails with a signing error
    #[must_use]
    pub const fn with_failing_signing(mut self) -> Self {
        self.fail_signing = true;
        self
    }

    /// Object stored under `key`
    #[must_use]
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .expect("blob store mutex poisoned")
            .get(key)
            .cloned()
    }

    /// Keys of every stored object
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("blob store mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::WriteError("injected write failure".to_string()));
        }

        let body = tokio::fs::read(path).await?;
        self.objects
            .lock()
            .expect("blob store mutex poisoned")
            .insert(
                key.to_string(),
                StoredObject {
                    body,
                    content_type: content_type.to_string(),
                },
            );
        Ok(())
    }

    async fn presign_get(
        &self,
        reference: &BlobReference,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> StorageResult<SignedUrl> {
        if self.fail_signing {
            return Err(StorageError::SigningError(
                "injected signing failure".to_string(),
            ));
        }

        let expires_at = issued_at + ttl;
        Ok(SignedUrl {
            url: format!(
                "https://{}.blob.test/{}?expires={}",
                reference.bucket,
                reference.key.trim_start_matches('/'),
                expires_at.timestamp()
            ),
            expires_at,
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.blob.test/{}",
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}

/// Media tools returning canned probe output
///
/// Remuxing copies the input file; a failing remux leaves a partial output behind
/// the way a crashed `ffmpeg` would.
#[derive(Debug)]
pub struct FakeMediaTools {
    probe: Result<Vec<u8>, String>,
    fail_remux: bool,
    probe_calls: AtomicUsize,
    remux_calls: AtomicUsize,
}

impl FakeMediaTools {
    /// Tools whose probe returns `json`
    #[must_use]
    pub fn with_probe_json(json: &str) -> Self {
        Self {
            probe: Ok(json.as_bytes().to_vec()),
            fail_remux: false,
            probe_calls: AtomicUsize::new(0),
            remux_calls: AtomicUsize::new(0),
        }
    }

    /// Probe output of a single 1920x1080 stream
    #[must_use]
    pub fn landscape() -> Self {
        Self::with_probe_json(r#"{"streams":[{"width":1920,"height":1080}]}"#)
    }

    /// Tools whose probe fails like a non-zero exit
    #[must_use]
    pub fn failing_probe() -> Self {
        Self {
            probe: Err("ffprobe exited with exit status: 1".to_string()),
            ..Self::with_probe_json("")
        }
    }

    /// Every remux fails after writing partial output
    #[must_use]
    pub fn with_failing_remux(mut self) -> Self {
        self.fail_remux = true;
        self
    }

    /// Number of probe invocations
    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Number of remux invocations
    pub fn remux_calls(&self) -> usize {
        self.remux_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTools for FakeMediaTools {
    async fn probe_streams(&self, _path: &Path) -> MediaResult<Vec<u8>> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.clone().map_err(MediaError::ProbeExecutionError)
    }

    async fn remux_faststart(&self, input: &Path, output: &Path) -> MediaResult<()> {
        self.remux_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_remux {
            tokio::fs::write(output, b"partial")
                .await
                .map_err(|e| MediaError::RemuxExecutionError(e.to_string()))?;
            return Err(MediaError::RemuxExecutionError(
                "ffmpeg exited with exit status: 1".to_string(),
            ));
        }

        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(|e| MediaError::RemuxExecutionError(e.to_string()))
    }
}
