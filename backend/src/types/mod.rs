mod config;
mod environment;
mod error;
mod extractors;

pub use config::{AppConfig, ThumbnailStrategy, VideoStoreKind, VideoUrlStrategy};
pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use extractors::{multipart_error, UploadForm, VideoId, VideoIdParams};
