//! Video record storage
//!
//! This crate owns the persisted video record and the repositories that load and
//! update it. The backend only ever talks to the [`VideoRepository`] trait, so the
//! `DynamoDB` table and the in-memory map are interchangeable.

pub mod video;

pub use video::{
    DynamoVideoStorage, InMemoryVideoStorage, VideoAttribute, VideoRecord, VideoRepository,
    VideoStorageError, VideoStorageResult,
};
