use serde::{Deserialize, Serialize};

/// How the downloadable streams were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMethod {
    /// The manifest URL rewritten into a progressive file URL.
    Simple,
    /// Separate video and audio segment files from the manifest.
    HlsSeparate,
    /// A video file from the manifest with no audio track.
    HlsVideoOnly,
    /// The page pointed at a media file directly.
    Direct,
    Failed,
}

impl ResolveMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::HlsSeparate => "hls_separate",
            Self::HlsVideoOnly => "hls_video_only",
            Self::Direct => "direct",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ResolveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Concrete video/audio URLs for one page.
///
/// Fields are private so the pairing rules hold: a failed resolution has no
/// video, and audio never appears without video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStreams {
    video_url: Option<String>,
    audio_url: Option<String>,
    method: ResolveMethod,
}

impl ResolvedStreams {
    pub fn failed() -> Self {
        Self {
            video_url: None,
            audio_url: None,
            method: ResolveMethod::Failed,
        }
    }

    pub fn simple(video_url: String) -> Self {
        Self {
            video_url: Some(video_url),
            audio_url: None,
            method: ResolveMethod::Simple,
        }
    }

    pub fn direct(video_url: String) -> Self {
        Self {
            video_url: Some(video_url),
            audio_url: None,
            method: ResolveMethod::Direct,
        }
    }

    pub fn hls(video_url: String, audio_url: Option<String>) -> Self {
        let method = if audio_url.is_some() {
            ResolveMethod::HlsSeparate
        } else {
            ResolveMethod::HlsVideoOnly
        };
        Self {
            video_url: Some(video_url),
            audio_url,
            method,
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    pub fn method(&self) -> ResolveMethod {
        self.method
    }

    pub fn is_failed(&self) -> bool {
        self.method == ResolveMethod::Failed
    }
}
