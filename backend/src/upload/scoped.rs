//! Files that remove themselves unless explicitly kept

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::{UploadError, UploadResult};

const SCRATCH_PREFIX: &str = "tubely-upload";

/// Local file deleted when dropped
///
/// Created before any bytes hit the disk so that every exit path, including
/// early returns and panics, cleans up.
#[derive(Debug)]
pub struct ScopedFile {
    path: TempPath,
}

impl ScopedFile {
    /// Takes ownership of `path`; the file need not exist yet
    #[must_use]
    pub fn guard(path: impl Into<PathBuf>) -> Self {
        Self {
            path: TempPath::from_path(path),
        }
    }

    /// Streams `body` into a fresh `tubely-upload*<suffix>` file under `dir`
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `body`, or `UploadError::Scratch` on I/O failure.
    /// The partial file is removed in both cases.
    pub async fn from_stream<S>(dir: &Path, suffix: &str, body: S) -> UploadResult<(Self, u64)>
    where
        S: Stream<Item = UploadResult<Bytes>> + Send,
    {
        let (file, path) = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?
            .into_parts();
        let scoped = Self { path };

        let mut file = tokio::fs::File::from_std(file);
        let mut body = std::pin::pin!(body);
        let mut written = 0_u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok((scoped, written))
    }

    /// Location of the file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarms the guard and leaves the file in place
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Scratch` if the guard cannot be released
    pub fn keep(self) -> UploadResult<PathBuf> {
        self.path
            .keep()
            .map_err(|e| UploadError::Scratch(e.error))
    }
}
