//! Environment configuration for different deployment stages

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use tracing::Level;

/// Default lifetime of signed video URLs (5 minutes)
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 5 * 60;

/// Default upper bound for a single `ffprobe`/`ffmpeg` invocation
pub const DEFAULT_MEDIA_TOOL_TIMEOUT_SECS: u64 = 120;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development {
                    presign_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set outside development
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "tubely-videos".to_string())
            }
        }
    }

    /// Returns the AWS region used for public S3 links
    #[must_use]
    pub fn s3_region(&self) -> String {
        env::var("S3_REGION")
            .or_else(|_| env::var("AWS_REGION"))
            .unwrap_or_else(|_| "us-east-1".to_string())
    }

    /// Returns the HS256 secret access tokens are signed with
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set outside development
    #[must_use]
    pub fn jwt_secret(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("JWT_SECRET").expect("JWT_SECRET environment variable is not set")
            }
            Self::Development { .. } => {
                env::var("JWT_SECRET").unwrap_or_else(|_| "development-secret".to_string())
            }
        }
    }

    /// Port the HTTP server listens on
    #[must_use]
    pub fn port(&self) -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8091)
    }

    /// Base URL clients use to reach this server, used for thumbnail links
    #[must_use]
    pub fn public_base_url(&self) -> String {
        env::var("PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://localhost:{}", self.port()))
    }

    /// Directory thumbnails are written to and served from
    #[must_use]
    pub fn assets_root(&self) -> PathBuf {
        env::var("ASSETS_ROOT").map_or_else(|_| PathBuf::from("assets"), PathBuf::from)
    }

    /// Directory scoped upload files are created in
    #[must_use]
    pub fn scratch_dir(&self) -> PathBuf {
        env::var("UPLOAD_SCRATCH_DIR").map_or_else(|_| env::temp_dir(), PathBuf::from)
    }

    /// Raw `THUMBNAIL_STRATEGY` value (`disk` or `data_url`)
    #[must_use]
    pub fn thumbnail_strategy(&self) -> String {
        env::var("THUMBNAIL_STRATEGY").unwrap_or_else(|_| "disk".to_string())
    }

    /// Raw `VIDEO_URL_STRATEGY` value (`signed` or `public`)
    #[must_use]
    pub fn video_url_strategy(&self) -> String {
        env::var("VIDEO_URL_STRATEGY").unwrap_or_else(|_| "signed".to_string())
    }

    /// Raw `VIDEO_STORE` value (`dynamodb` or `memory`)
    #[must_use]
    pub fn video_store(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("VIDEO_STORE").unwrap_or_else(|_| "dynamodb".to_string())
            }
            Self::Development { .. } => {
                env::var("VIDEO_STORE").unwrap_or_else(|_| "memory".to_string())
            }
        }
    }

    /// Dynamo DB table holding video records
    #[must_use]
    pub fn videos_table_name(&self) -> String {
        env::var("VIDEOS_TABLE_NAME").unwrap_or_else(|_| "tubely-videos".to_string())
    }

    /// Path of the `ffprobe` executable
    #[must_use]
    pub fn ffprobe_path(&self) -> String {
        env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string())
    }

    /// Path of the `ffmpeg` executable
    #[must_use]
    pub fn ffmpeg_path(&self) -> String {
        env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string())
    }

    /// Upper bound for a single external media tool invocation
    #[must_use]
    pub fn media_tool_timeout(&self) -> Duration {
        let secs = env::var("MEDIA_TOOL_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MEDIA_TOOL_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        // Uploads of up to 1 GiB go through a single PutObject call
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(300))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Signed video URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_SIGNED_URL_TTL_SECS,
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
        }
    }

    /// Default log level, overridable through `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}
