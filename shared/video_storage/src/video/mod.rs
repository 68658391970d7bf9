//! Video record storage integration using Dynamo DB
//!
//! A video record is created before any media is uploaded. The upload flows only
//! ever replace the `thumbnail_url` and `video_url` fields of an existing record.

mod error;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError, operation::put_item::PutItemError, types::AttributeValue,
    Client as DynamoDbClient,
};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

pub use error::{VideoStorageError, VideoStorageResult};
pub use memory::InMemoryVideoStorage;

/// Attribute names for the videos table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "camelCase")]
pub enum VideoAttribute {
    /// Video id (Primary Key)
    Id,
    /// Owning user id
    UserId,
    /// Thumbnail URL
    ThumbnailUrl,
    /// Video URL or blob reference
    VideoUrl,
}

/// Persisted video record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Video id
    pub id: Uuid,
    /// Id of the user that owns the video
    pub user_id: Uuid,
    /// Human readable title
    #[serde(default)]
    pub title: String,
    /// Free form description
    #[serde(default)]
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Direct link or inline `data:` URL of the thumbnail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Either a `bucket,key` blob reference or a direct link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl VideoRecord {
    /// Creates a new record without any media attached
    #[must_use]
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
        }
    }

    /// Whether `user_id` is allowed to mutate the media fields of this record
    #[must_use]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Bumps `updated_at` to the current time
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Key-value repository for video records
///
/// Implementations are expected to offer read-your-writes consistency per key.
/// Concurrent updates to the same record are last-write-wins.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Loads a record by id, `None` when it does not exist
    async fn get(&self, id: Uuid) -> VideoStorageResult<Option<VideoRecord>>;

    /// Inserts a new record, failing when the id is already taken
    async fn insert(&self, video: &VideoRecord) -> VideoStorageResult<()>;

    /// Replaces an existing record, failing when it does not exist
    async fn update(&self, video: &VideoRecord) -> VideoStorageResult<()>;
}

/// Video storage client for Dynamo DB operations
pub struct DynamoVideoStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl DynamoVideoStorage {
    /// Creates a new video storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for video records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    async fn put(&self, video: &VideoRecord, condition: &str) -> VideoStorageResult<()> {
        let item = serde_dynamo::to_item(video)
            .map_err(|e| VideoStorageError::SerializationError(e.to_string()))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(condition)
            .expression_attribute_names("#pk", VideoAttribute::Id.to_string())
            .send()
            .await?;

        Ok(())
    }
}

fn is_conditional_check_failed(err: &SdkError<PutItemError>) -> bool {
    matches!(err, SdkError::ServiceError(svc) if svc.err().is_conditional_check_failed_exception())
}

#[async_trait]
impl VideoRepository for DynamoVideoStorage {
    async fn get(&self, id: Uuid) -> VideoStorageResult<Option<VideoRecord>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                VideoAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        let item = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()
            .map_err(|e| VideoStorageError::SerializationError(e.to_string()))?;

        Ok(item)
    }

    async fn insert(&self, video: &VideoRecord) -> VideoStorageResult<()> {
        self.put(video, "attribute_not_exists(#pk)")
            .await
            .map_err(|err| match err {
                VideoStorageError::DynamoDbPutError(ref e) if is_conditional_check_failed(e) => {
                    VideoStorageError::VideoExists(video.id.to_string())
                }
                other => other,
            })
    }

    async fn update(&self, video: &VideoRecord) -> VideoStorageResult<()> {
        self.put(video, "attribute_exists(#pk)")
            .await
            .map_err(|err| match err {
                VideoStorageError::DynamoDbPutError(ref e) if is_conditional_check_failed(e) => {
                    VideoStorageError::VideoNotFound(video.id.to_string())
                }
                other => other,
            })
    }
}
