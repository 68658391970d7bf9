//! Media inspection and container normalization backed by `ffprobe`/`ffmpeg`

mod error;
mod inspector;
mod normalizer;
mod tools;

pub use error::{MediaError, MediaResult};
pub use inspector::{parse_probe_output, AspectClass, MediaInspector, MediaMetadata};
pub use normalizer::ContainerNormalizer;
pub use tools::{FfmpegTools, MediaTools};
