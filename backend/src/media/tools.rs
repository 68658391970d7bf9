use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::instrument;

use super::{MediaError, MediaResult};

/// External media tooling
///
/// Kept narrow so tests can swap in canned metadata instead of spawning processes.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Returns the raw JSON stream listing of the file at `path`
    async fn probe_streams(&self, path: &Path) -> MediaResult<Vec<u8>>;

    /// Copies all streams of `input` into an mp4 at `output` with the index moved to the front
    async fn remux_faststart(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// [`MediaTools`] implementation that shells out to `ffprobe` and `ffmpeg`
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffprobe_path: String,
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegTools {
    /// Creates the adapter
    ///
    /// # Arguments
    ///
    /// * `ffprobe_path` - Executable used for probing
    /// * `ffmpeg_path` - Executable used for remuxing
    /// * `timeout` - Upper bound for a single invocation, the process is killed afterwards
    #[must_use]
    pub const fn new(ffprobe_path: String, ffmpeg_path: String, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            ffmpeg_path,
            timeout,
        }
    }

    async fn run<I, S>(&self, program: &str, args: I) -> Result<Output, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = std::time::Instant::now();
        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                return Err(format!(
                    "{program} timed out after {}s",
                    self.timeout.as_secs()
                ))
            }
            Ok(Err(e)) => return Err(format!("failed to start {program}: {e}")),
            Ok(Ok(output)) => output,
        };

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            status = %output.status,
            "{program} finished"
        );

        if !output.status.success() {
            return Err(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(output)
    }
}

#[async_trait]
impl MediaTools for FfmpegTools {
    #[instrument(skip(self), fields(process.executable.path = %self.ffprobe_path))]
    async fn probe_streams(&self, path: &Path) -> MediaResult<Vec<u8>> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];

        self.run(&self.ffprobe_path, args)
            .await
            .map(|output| output.stdout)
            .map_err(MediaError::ProbeExecutionError)
    }

    #[instrument(skip(self), fields(process.executable.path = %self.ffmpeg_path))]
    async fn remux_faststart(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let args = [
            OsStr::new("-y"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output.as_os_str(),
        ];

        self.run(&self.ffmpeg_path, args)
            .await
            .map(|_| ())
            .map_err(MediaError::RemuxExecutionError)
    }
}
