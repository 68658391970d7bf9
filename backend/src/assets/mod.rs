//! Thumbnail persistence behind the configured [`ThumbnailStrategy`]

use base64::{engine::general_purpose::STANDARD, Engine};
use mime::Mime;
use tracing::instrument;

use crate::types::ThumbnailStrategy;
use crate::upload::{random_key, ScopedFile, UploadResult};

/// Route prefix the asset directory is served under
pub const ASSETS_ROUTE: &str = "/assets";

/// A stored thumbnail and, for disk storage, the guard over its file
///
/// The file is removed when the guard is dropped, so callers keep it only
/// once the record pointing at it is saved.
#[derive(Debug)]
pub struct StoredThumbnail {
    /// URL to record on the video
    pub url: String,
    /// Guard over the written file, `None` for data URLs
    pub file: Option<ScopedFile>,
}

impl StoredThumbnail {
    /// Makes the stored file permanent
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Scratch` if the file guard cannot be released
    pub fn commit(self) -> UploadResult<String> {
        if let Some(file) = self.file {
            file.keep()?;
        }
        Ok(self.url)
    }
}

/// Writes thumbnails according to a [`ThumbnailStrategy`]
#[derive(Debug, Clone)]
pub struct ThumbnailStore {
    strategy: ThumbnailStrategy,
}

impl ThumbnailStore {
    /// Store writing with `strategy`
    #[must_use]
    pub const fn new(strategy: ThumbnailStrategy) -> Self {
        Self { strategy }
    }

    /// Stores `data` of type `media_type` and returns the URL to record
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Scratch` if the asset file cannot be written
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub async fn store(&self, media_type: &Mime, data: &[u8]) -> UploadResult<StoredThumbnail> {
        match &self.strategy {
            ThumbnailStrategy::Disk {
                assets_root,
                public_base_url,
            } => {
                let file_name = format!("{}.{}", random_key(), media_type.subtype());
                let path = assets_root.join(&file_name);

                tokio::fs::create_dir_all(assets_root).await?;
                let file = ScopedFile::guard(&path);
                tokio::fs::write(&path, data).await?;

                tracing::debug!(path = %path.display(), "Thumbnail written");

                Ok(StoredThumbnail {
                    url: asset_url(public_base_url, &file_name),
                    file: Some(file),
                })
            }
            ThumbnailStrategy::DataUrl => Ok(StoredThumbnail {
                url: data_url(media_type, data),
                file: None,
            }),
        }
    }
}

/// `<base>/assets/<file_name>`
#[must_use]
pub fn asset_url(public_base_url: &str, file_name: &str) -> String {
    format!(
        "{}{ASSETS_ROUTE}/{file_name}",
        public_base_url.trim_end_matches('/')
    )
}

/// `data:<essence>;base64,<payload>`
#[must_use]
pub fn data_url(media_type: &Mime, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        media_type.essence_str(),
        STANDARD.encode(data)
    )
}
