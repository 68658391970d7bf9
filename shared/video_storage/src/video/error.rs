//! Error types for video record storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, put_item::PutItemError};
use thiserror::Error;

/// Result type for video storage operations
pub type VideoStorageResult<T> = Result<T, VideoStorageError>;

/// Errors that can occur during video storage operations
#[derive(Error, Debug)]
pub enum VideoStorageError {
    /// Failed to write a video record into Dynamo DB
    #[error("Failed to put video into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to read a video record from Dynamo DB
    #[error("Failed to get video from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// A record with the same id already exists
    #[error("Video already exists: {0}")]
    VideoExists(String),

    /// The record to update does not exist
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
