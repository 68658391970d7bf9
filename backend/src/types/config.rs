//! Immutable runtime configuration resolved once at startup

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use strum::{Display, EnumString};

use super::Environment;

/// Where uploaded thumbnails end up
///
/// The two strategies are mutually exclusive. `Disk` is the default since data URLs
/// inflate every stored record and every response that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailStrategy {
    /// Write the image under `assets_root` and link to it through `public_base_url`
    Disk {
        /// Directory the files are written to
        assets_root: PathBuf,
        /// Base URL the `/assets` route is reachable at
        public_base_url: String,
    },
    /// Inline the image into the record as a `data:` URL
    DataUrl,
}

/// How the stored video URL is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VideoUrlStrategy {
    /// Store a `bucket,key` reference and sign a fresh URL on every read
    Signed,
    /// Store the direct public S3 link
    Public,
}

/// Backing store for video records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum VideoStoreKind {
    /// Dynamo DB table
    #[strum(serialize = "dynamodb")]
    DynamoDb,
    /// Process-local map, lost on restart
    Memory,
}

/// Process-wide configuration shared by every request
#[derive(Clone)]
pub struct AppConfig {
    /// Bucket videos are uploaded to
    pub bucket: String,
    /// Region of the bucket, used for public links
    pub region: String,
    /// Listen port
    pub port: u16,
    /// HS256 secret for access tokens
    pub jwt_secret: String,
    /// Where thumbnails are kept
    pub thumbnail_strategy: ThumbnailStrategy,
    /// How video URLs are stored
    pub video_url_strategy: VideoUrlStrategy,
    /// Backing store for records
    pub video_store: VideoStoreKind,
    /// Dynamo table holding the records
    pub videos_table_name: String,
    /// Directory for scoped upload files
    pub scratch_dir: PathBuf,
    /// Lifetime of signed video URLs
    pub signed_url_ttl: Duration,
    /// Upper bound for one `ffprobe`/`ffmpeg` run
    pub media_tool_timeout: Duration,
    /// `ffprobe` executable
    pub ffprobe_path: String,
    /// `ffmpeg` executable
    pub ffmpeg_path: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("thumbnail_strategy", &self.thumbnail_strategy)
            .field("video_url_strategy", &self.video_url_strategy)
            .field("video_store", &self.video_store)
            .field("videos_table_name", &self.videos_table_name)
            .field("scratch_dir", &self.scratch_dir)
            .field("signed_url_ttl", &self.signed_url_ttl)
            .field("media_tool_timeout", &self.media_tool_timeout)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Resolves the configuration for `environment`
    ///
    /// # Panics
    ///
    /// Panics on required values missing in production or on unknown strategy names
    #[must_use]
    pub fn from_environment(environment: &Environment) -> Self {
        let thumbnail_strategy = match environment.thumbnail_strategy().as_str() {
            "disk" => ThumbnailStrategy::Disk {
                assets_root: environment.assets_root(),
                public_base_url: environment.public_base_url(),
            },
            "data_url" => ThumbnailStrategy::DataUrl,
            other => panic!("Invalid THUMBNAIL_STRATEGY: {other}"),
        };

        let video_url_strategy = VideoUrlStrategy::from_str(&environment.video_url_strategy())
            .unwrap_or_else(|_| {
                panic!(
                    "Invalid VIDEO_URL_STRATEGY: {}",
                    environment.video_url_strategy()
                )
            });

        let video_store = VideoStoreKind::from_str(&environment.video_store())
            .unwrap_or_else(|_| panic!("Invalid VIDEO_STORE: {}", environment.video_store()));

        Self {
            bucket: environment.s3_bucket(),
            region: environment.s3_region(),
            port: environment.port(),
            jwt_secret: environment.jwt_secret(),
            thumbnail_strategy,
            video_url_strategy,
            video_store,
            videos_table_name: environment.videos_table_name(),
            scratch_dir: environment.scratch_dir(),
            signed_url_ttl: Duration::from_secs(environment.presigned_url_expiry_secs()),
            media_tool_timeout: environment.media_tool_timeout(),
            ffprobe_path: environment.ffprobe_path(),
            ffmpeg_path: environment.ffmpeg_path(),
        }
    }

    /// Directory served under `/assets`, when thumbnails are written to disk
    #[must_use]
    pub fn assets_root(&self) -> Option<&PathBuf> {
        match &self.thumbnail_strategy {
            ThumbnailStrategy::Disk { assets_root, .. } => Some(assets_root),
            ThumbnailStrategy::DataUrl => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(
            VideoUrlStrategy::from_str("signed").unwrap(),
            VideoUrlStrategy::Signed
        );
        assert_eq!(
            VideoUrlStrategy::from_str("public").unwrap(),
            VideoUrlStrategy::Public
        );
        assert!(VideoUrlStrategy::from_str("cdn").is_err());
        assert_eq!(
            VideoStoreKind::from_str("dynamodb").unwrap(),
            VideoStoreKind::DynamoDb
        );
        assert_eq!(
            VideoStoreKind::from_str("memory").unwrap(),
            VideoStoreKind::Memory
        );
    }

    #[test]
    #[serial]
    fn test_from_development_environment() {
        for var in [
            "THUMBNAIL_STRATEGY",
            "VIDEO_URL_STRATEGY",
            "VIDEO_STORE",
            "ASSETS_ROOT",
            "PORT",
            "PUBLIC_BASE_URL",
        ] {
            env::remove_var(var);
        }

        let config = AppConfig::from_environment(&Environment::Development {
            presign_expiry_override: None,
        });

        assert_eq!(
            config.thumbnail_strategy,
            ThumbnailStrategy::Disk {
                assets_root: PathBuf::from("assets"),
                public_base_url: "http://localhost:8091".to_string(),
            }
        );
        assert_eq!(config.video_url_strategy, VideoUrlStrategy::Signed);
        assert_eq!(config.video_store, VideoStoreKind::Memory);
        assert_eq!(config.signed_url_ttl, Duration::from_secs(300));
        assert_eq!(config.assets_root(), Some(&PathBuf::from("assets")));
    }

    #[test]
    #[serial]
    fn test_data_url_strategy() {
        env::set_var("THUMBNAIL_STRATEGY", "data_url");
        let config = AppConfig::from_environment(&Environment::Development {
            presign_expiry_override: None,
        });
        env::remove_var("THUMBNAIL_STRATEGY");

        assert_eq!(config.thumbnail_strategy, ThumbnailStrategy::DataUrl);
        assert!(config.assets_root().is_none());
    }

    #[test]
    #[serial]
    fn test_debug_redacts_secret() {
        let mut config = AppConfig::from_environment(&Environment::Development {
            presign_expiry_override: None,
        });
        config.jwt_secret = "super-secret".to_string();

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }
}
