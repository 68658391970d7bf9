use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use strum::Display;
use tracing::instrument;

use super::{MediaError, MediaResult, MediaTools};

/// Coarse orientation of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AspectClass {
    /// 16:9
    #[strum(serialize = "16:9")]
    Landscape,
    /// 9:16
    #[strum(serialize = "9:16")]
    Portrait,
    /// Anything else
    #[strum(serialize = "other")]
    Other,
}

impl AspectClass {
    /// Classifies `width / height` rounded to two decimals
    ///
    /// This is a literal match on 1.78 and 0.56, not a tolerance band: 1.77 or 1.79
    /// (e.g. 1280x724) fall into `Other`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height == 0 {
            return Self::Other;
        }

        // f64::round is half away from zero
        let hundredths = (100.0 * (f64::from(width) / f64::from(height))).round();

        if hundredths == 178.0 {
            Self::Landscape
        } else if hundredths == 56.0 {
            Self::Portrait
        } else {
            Self::Other
        }
    }

    /// Blob store key prefix videos of this class are filed under
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::Landscape => "/landscape/",
            Self::Portrait => "/portrait/",
            Self::Other => "/other/",
        }
    }
}

/// Dimensions of the first video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl MediaMetadata {
    /// Classification of these dimensions
    #[must_use]
    pub fn aspect_class(&self) -> AspectClass {
        AspectClass::from_dimensions(self.width, self.height)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl ProbeStream {
    /// Streams without a `codec_type` are assumed to be video
    fn is_video(&self) -> bool {
        self.codec_type.as_deref().is_none_or(|kind| kind == "video")
    }
}

/// Extracts the first video stream's dimensions from `ffprobe -print_format json -show_streams`
///
/// # Errors
///
/// - `MediaError::MetadataParseError` if the output is not the expected JSON shape,
///   or the video stream lacks a usable width/height
/// - `MediaError::NoStreamError` if no video stream is listed
pub fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaMetadata> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| MediaError::MetadataParseError(format!("invalid ffprobe output: {e}")))?;

    let stream = probe
        .streams
        .iter()
        .find(|stream| stream.is_video())
        .ok_or(MediaError::NoStreamError)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if height > 0 => Ok(MediaMetadata { width, height }),
        (width, height) => Err(MediaError::MetadataParseError(format!(
            "video stream has unusable dimensions {width:?}x{height:?}"
        ))),
    }
}

/// Probes local files and classifies their aspect ratio
pub struct MediaInspector {
    tools: Arc<dyn MediaTools>,
}

impl MediaInspector {
    /// Creates an inspector over `tools`
    #[must_use]
    pub fn new(tools: Arc<dyn MediaTools>) -> Self {
        Self { tools }
    }

    /// Reads the dimensions of the first video stream of the file at `path`
    ///
    /// # Errors
    ///
    /// See [`parse_probe_output`]; additionally `MediaError::ProbeExecutionError`
    /// when the probe process fails
    pub async fn metadata(&self, path: &Path) -> MediaResult<MediaMetadata> {
        let stdout = self.tools.probe_streams(path).await?;
        parse_probe_output(&stdout)
    }

    /// Classifies the aspect ratio of the file at `path`
    ///
    /// # Errors
    ///
    /// Same as [`MediaInspector::metadata`]
    #[instrument(skip(self))]
    pub async fn inspect(&self, path: &Path) -> MediaResult<AspectClass> {
        let metadata = self.metadata(path).await?;
        let aspect = metadata.aspect_class();

        tracing::info!(
            width = metadata.width,
            height = metadata.height,
            aspect = %aspect,
            "Video probe completed"
        );

        Ok(aspect)
    }
}
