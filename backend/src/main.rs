use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use video_storage::{DynamoVideoStorage, InMemoryVideoStorage, VideoRepository};

use backend::{
    media::FfmpegTools,
    media_storage::{MediaStorage, SystemClock},
    server,
    state::AppContext,
    types::{AppConfig, Environment, VideoStoreKind},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(environment.tracing_level().into())
        .from_env_lossy();

    // JSON logs for staging/production, human readable in development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let config = AppConfig::from_environment(&environment);
    tracing::info!(?config, "Configuration loaded");

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let blob_store = Arc::new(MediaStorage::new(
        s3_client,
        config.bucket.clone(),
        config.region.clone(),
    ));

    let videos: Arc<dyn VideoRepository> = match config.video_store {
        VideoStoreKind::DynamoDb => {
            let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
            Arc::new(DynamoVideoStorage::new(
                dynamodb_client,
                config.videos_table_name.clone(),
            ))
        }
        VideoStoreKind::Memory => {
            tracing::warn!("Video records are kept in memory and lost on restart");
            Arc::new(InMemoryVideoStorage::new())
        }
    };

    let media_tools = Arc::new(FfmpegTools::new(
        config.ffprobe_path.clone(),
        config.ffmpeg_path.clone(),
        config.media_tool_timeout,
    ));

    let context = AppContext::new(
        config,
        videos,
        blob_store,
        media_tools,
        Arc::new(SystemClock),
    );

    server::start(environment, context).await
}
