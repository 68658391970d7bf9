use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::instrument;

use super::{MediaResult, MediaTools};

const OUTPUT_SUFFIX: &str = ".processing";

/// Rewrites uploads so the container index sits at the front of the file
///
/// Streams are copied, never re-encoded.
pub struct ContainerNormalizer {
    tools: Arc<dyn MediaTools>,
}

impl ContainerNormalizer {
    /// Creates a normalizer over `tools`
    #[must_use]
    pub fn new(tools: Arc<dyn MediaTools>) -> Self {
        Self { tools }
    }

    /// Sibling path the normalized copy of `input` is written to
    #[must_use]
    pub fn output_path(input: &Path) -> PathBuf {
        let mut output = input.as_os_str().to_owned();
        output.push(OUTPUT_SUFFIX);
        PathBuf::from(output)
    }

    /// Writes a fast-start copy of `input` to [`ContainerNormalizer::output_path`]
    ///
    /// `input` is left untouched. The caller owns both files afterwards.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::RemuxExecutionError` if the remux process fails
    #[instrument(skip(self))]
    pub async fn normalize(&self, input: &Path) -> MediaResult<PathBuf> {
        let output = Self::output_path(input);
        self.tools.remux_faststart(input, &output).await?;
        Ok(output)
    }
}
