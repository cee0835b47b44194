//! Runtime configuration shared by the library and the CLI.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";
pub const DEFAULT_WATERMARK: &str = "@faithandfork";
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_FONT_SIZE: u32 = 20;

fn default_watermark() -> String {
    DEFAULT_WATERMARK.to_string()
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinvidConfig {
    pub http: HttpConfig,
    pub mux: MuxConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request. Unset uses [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,

    /// Overall request timeout in seconds. Unset means requests never time out.
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Settings for the ffmpeg mux step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxConfig {
    /// Path to ffmpeg binary.
    /// If omitted, uses env `FFMPEG_PATH` or defaults to `ffmpeg`.
    #[serde(default)]
    pub ffmpeg_path: Option<String>,

    /// Text burned into the bottom of the muxed video.
    #[serde(default = "default_watermark")]
    pub watermark: String,

    /// Video encoder used while burning in the watermark.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            watermark: default_watermark(),
            video_codec: default_video_codec(),
            font_size: default_font_size(),
        }
    }
}

impl MuxConfig {
    pub fn resolve_ffmpeg_path(&self) -> String {
        self.ffmpeg_path
            .clone()
            .or_else(|| std::env::var("FFMPEG_PATH").ok())
            .unwrap_or_else(|| "ffmpeg".to_string())
    }
}
