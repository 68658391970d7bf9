//! Tubely video hosting backend

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

/// Thumbnail persistence
pub mod assets;

/// Access token validation
pub mod jwt;

/// `ffprobe`/`ffmpeg` backed inspection and remuxing
pub mod media;

/// Blob store, blob references and signed URLs
pub mod media_storage;

/// Request extractors for authentication
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Router construction and server startup
pub mod server;

/// Application context
pub mod state;

/// Configuration, errors and extractors
pub mod types;

/// Upload orchestration
pub mod upload;

/// In-process fakes for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
