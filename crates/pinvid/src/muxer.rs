//! Video/audio muxing through an external tool.
//!
//! [`MuxTool`] is the capability boundary (availability probe + one mux run);
//! [`Muxer`] adds the pipeline rules around it: probe first, and delete the
//! inputs only after the tool succeeded.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::{config::MuxConfig, error::MuxError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MuxTool: Send + Sync {
    /// Whether the tool can be run at all.
    async fn probe(&self) -> bool;

    /// Combine `video` and `audio` into `output`. `true` on success.
    async fn run(&self, video: &Path, audio: &Path, output: &Path) -> bool;
}

pub struct Muxer {
    tool: Arc<dyn MuxTool>,
}

impl Muxer {
    pub fn new(tool: Arc<dyn MuxTool>) -> Self {
        Self { tool }
    }

    /// Mux `video` + `audio` into `output`.
    ///
    /// On failure both inputs are left untouched. On success they are removed;
    /// a removal error is only logged.
    #[instrument(skip_all, fields(output = %output.display()))]
    pub async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), MuxError> {
        if !self.tool.probe().await {
            warn!("mux tool not available, skipping merge");
            return Err(MuxError::ToolUnavailable);
        }

        if !self.tool.run(video, audio, output).await {
            return Err(MuxError::ToolFailed {
                output: output.to_path_buf(),
            });
        }

        for input in [video, audio] {
            if let Err(e) = tokio::fs::remove_file(input).await {
                warn!(path = %input.display(), error = %e, "failed to remove mux input");
            }
        }
        info!("merged video and audio tracks");
        Ok(())
    }
}

/// ffmpeg-backed [`MuxTool`]: copies the audio stream, re-encodes video and
/// burns a boxed text watermark near the bottom of the frame.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    binary_path: String,
    watermark: String,
    video_codec: String,
    font_size: u32,
}

impl FfmpegTool {
    pub fn new() -> Self {
        Self::with_config(&MuxConfig::default())
    }

    pub fn with_config(config: &MuxConfig) -> Self {
        Self {
            binary_path: config.resolve_ffmpeg_path(),
            watermark: config.watermark.clone(),
            video_codec: config.video_codec.clone(),
            font_size: config.font_size,
        }
    }

    /// Quote `value` for a single-quoted filter option. Inside the quotes
    /// everything is literal, so a `'` has to close the quote, be escaped and
    /// reopen it.
    fn quote_filter_value(value: &str) -> String {
        format!("'{}'", value.replace('\'', r"'\''"))
    }

    pub fn drawtext_filter(&self) -> String {
        format!(
            "drawtext=text={}:fontsize={}:fontcolor=white:x=(w-text_w)/2:y=h-th-200:box=1:boxcolor=black@0.5:boxborderw=5",
            Self::quote_filter_value(&self.watermark),
            self.font_size
        )
    }

    pub fn build_args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(14);
        args.push("-i".into());
        args.push(video.into());
        args.push("-i".into());
        args.push(audio.into());
        args.extend(["-c:a", "copy", "-c:v"].map(OsString::from));
        args.push(self.video_codec.clone().into());
        args.push("-vf".into());
        args.push(self.drawtext_filter().into());
        args.push("-y".into());
        args.push(output.into());
        args
    }
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MuxTool for FfmpegTool {
    async fn probe(&self) -> bool {
        let status = Command::new(&self.binary_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                debug!(binary = %self.binary_path, error = %e, "ffmpeg probe failed");
                false
            }
        }
    }

    async fn run(&self, video: &Path, audio: &Path, output: &Path) -> bool {
        let args = self.build_args(video, audio, output);
        debug!(binary = %self.binary_path, ?args, "running ffmpeg");

        let output = match Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "failed to start ffmpeg");
                return false;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            warn!(
                status = %output.status,
                stderr = %tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
                "ffmpeg exited unsuccessfully"
            );
            return false;
        }
        true
    }
}
