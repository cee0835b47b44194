//! End-to-end download of one pin.
//!
//! [`PinDownloader::download`] walks the stages in order and stops at the
//! first terminal failure. Every await is sequential.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    config::PinvidConfig,
    error::{DownloadFailure, TransportError},
    fetcher::download_file,
    http::{HttpTransport, ReqwestTransport},
    media::{MediaReference, PageMetadata, ResolvedStreams},
    muxer::{FfmpegTool, MuxTool, Muxer},
    resolver::{ManifestResolver, PageResolver, page::is_short_link},
};

const NO_PLAYLIST_VIDEO: &str = "Could not find downloadable video from playlist";
const VIDEO_TRACK_FAILED: &str = "Failed to download video track";
const AUDIO_TRACK_FAILED: &str = "Failed to download audio track";
const VIDEO_FILE_FAILED: &str = "Failed to download video file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolvingPage,
    ExtractingCandidate,
    ResolvingStreams,
    Downloading,
    Muxing,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolvingPage => "resolving_page",
            Self::ExtractingCandidate => "extracting_candidate",
            Self::ResolvingStreams => "resolving_streams",
            Self::Downloading => "downloading",
            Self::Muxing => "muxing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one download request; names every file it writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `<local time>_<8 hex chars>`, e.g. `2024-05-01T13-45-09_9f2c41ab`.
    pub fn generate() -> Self {
        let timestamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{timestamp}_{}", &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn final_file(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.mp4", self.0))
    }

    fn video_file(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_video.mp4", self.0))
    }

    fn audio_file(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_audio.mp4", self.0))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    file_path: PathBuf,
    metadata: PageMetadata,
}

impl DownloadResult {
    pub fn new(file_path: PathBuf, metadata: PageMetadata) -> Self {
        Self {
            file_path,
            metadata,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }
}

pub struct PinDownloader {
    http: Arc<dyn HttpTransport>,
    pages: PageResolver,
    manifests: ManifestResolver,
    muxer: Muxer,
}

impl PinDownloader {
    pub fn new(http: Arc<dyn HttpTransport>, mux_tool: Arc<dyn MuxTool>) -> Self {
        Self {
            pages: PageResolver::new(http.clone()),
            manifests: ManifestResolver::new(http.clone()),
            muxer: Muxer::new(mux_tool),
            http,
        }
    }

    /// Build a downloader backed by reqwest and ffmpeg.
    pub fn from_config(config: &PinvidConfig) -> Result<Self, TransportError> {
        let http = ReqwestTransport::from_config(&config.http)?;
        let tool = FfmpegTool::with_config(&config.mux);
        Ok(Self::new(Arc::new(http), Arc::new(tool)))
    }

    /// Resolve `page_url` and write its video into `output_dir`.
    #[instrument(skip(self, output_dir, job), fields(job = %job))]
    pub async fn download(
        &self,
        page_url: &str,
        output_dir: &Path,
        job: &JobId,
    ) -> Result<DownloadResult, DownloadFailure> {
        let canonical = if is_short_link(page_url) {
            self.pages
                .expand_short_link(page_url)
                .await
                .map_err(|e| fail(Stage::ResolvingPage, e.user_message(), &e))?
        } else {
            page_url.to_string()
        };

        let scan = self
            .pages
            .scan(&canonical)
            .await
            .map_err(|e| fail(Stage::ExtractingCandidate, e.user_message(), &e))?;

        let streams = match &scan.candidate {
            MediaReference::Manifest(url) => self.manifests.resolve(url).await,
            MediaReference::Direct(url) => ResolvedStreams::direct(url.clone()),
        };
        let Some(video_url) = streams.video_url() else {
            return Err(fail(Stage::ResolvingStreams, NO_PLAYLIST_VIDEO, &"no video stream"));
        };
        info!(method = %streams.method(), "resolved streams");

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| fail(Stage::Downloading, VIDEO_FILE_FAILED, &e))?;
        let final_path = job.final_file(output_dir);

        let file_path = match streams.audio_url() {
            Some(audio_url) => {
                self.download_tracks(video_url, audio_url, output_dir, &final_path, job)
                    .await?
            }
            None => {
                download_file(self.http.as_ref(), video_url, &final_path)
                    .await
                    .map_err(|e| fail(Stage::Downloading, VIDEO_FILE_FAILED, &e))?;
                final_path
            }
        };

        info!(stage = %Stage::Done, path = %file_path.display(), "download finished");
        Ok(DownloadResult::new(file_path, scan.metadata))
    }

    /// Two-track flow: both tracks into temp files, then mux. A failed mux
    /// falls back to the bare video track.
    async fn download_tracks(
        &self,
        video_url: &str,
        audio_url: &str,
        output_dir: &Path,
        final_path: &Path,
        job: &JobId,
    ) -> Result<PathBuf, DownloadFailure> {
        let video_path = job.video_file(output_dir);
        let audio_path = job.audio_file(output_dir);

        download_file(self.http.as_ref(), video_url, &video_path)
            .await
            .map_err(|e| fail(Stage::Downloading, VIDEO_TRACK_FAILED, &e))?;

        if let Err(e) = download_file(self.http.as_ref(), audio_url, &audio_path).await {
            if let Err(remove_err) = tokio::fs::remove_file(&video_path).await {
                warn!(path = %video_path.display(), error = %remove_err, "failed to remove video track");
            }
            return Err(fail(Stage::Downloading, AUDIO_TRACK_FAILED, &e));
        }

        match self.muxer.merge(&video_path, &audio_path, final_path).await {
            Ok(()) => Ok(final_path.to_path_buf()),
            Err(e) => {
                warn!(
                    stage = %Stage::Muxing,
                    error = %e,
                    audio = %audio_path.display(),
                    "mux failed, keeping video track only; audio track left on disk"
                );
                Ok(video_path)
            }
        }
    }
}

fn fail(stage: Stage, message: impl Into<String>, cause: &dyn fmt::Display) -> DownloadFailure {
    let failure = DownloadFailure::new(stage, message);
    warn!(%stage, cause = %cause, "{}", failure.message);
    failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{muxer::MockMuxTool, test_support::FakeTransport};

    const PAGE: &str = "https://www.pinterest.com/pin/42/";
    const MANIFEST: &str = "https://v1.pinimg.com/videos/iht/hls/ab/cd/ef.m3u8";
    const VIDEO: &str = "https://v1.pinimg.com/videos/iht/hls/ab/cd/ef_720w.cmfv";
    const AUDIO: &str = "https://v1.pinimg.com/videos/iht/hls/ab/cd/ef_audio.cmfa";
    const DIRECT: &str = "https://v1.pinimg.com/videos/mc/720p/ab/cd/ef.mp4";

    fn page_with(src: &str) -> String {
        format!(
            r#"<html><head><meta property="og:title" content="Focaccia"></head>
            <body><video class="hwa kVc MIw L4E" src="{src}"></video></body></html>"#
        )
    }

    fn two_track_transport() -> FakeTransport {
        FakeTransport::new()
            .with(PAGE, 200, page_with(MANIFEST))
            .with(
                MANIFEST,
                200,
                "#EXTM3U\n#EXT-X-MEDIA:TYPE=AUDIO,URI=\"ef_audio.m3u8\"\nef_720w.m3u8\n",
            )
            .with(
                "https://v1.pinimg.com/videos/iht/hls/ab/cd/ef_audio.m3u8",
                200,
                "ef_audio.cmfa\n",
            )
            .with(
                "https://v1.pinimg.com/videos/iht/hls/ab/cd/ef_720w.m3u8",
                200,
                "ef_720w.cmfv\n",
            )
            .with(VIDEO, 200, "video-bytes")
    }

    fn idle_tool() -> Arc<MockMuxTool> {
        let mut tool = MockMuxTool::new();
        tool.expect_probe().never();
        tool.expect_run().never();
        Arc::new(tool)
    }

    #[test]
    fn test_job_id_format() {
        let id = JobId::generate();
        let (timestamp, suffix) = id.as_str().rsplit_once('_').unwrap();

        assert_eq!(timestamp.len(), "2024-05-01T13-45-09".len());
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H-%M-%S").is_ok());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(JobId::generate(), JobId::generate());
    }

    #[tokio::test]
    async fn test_direct_candidate_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested/out");
        let http = FakeTransport::new()
            .with(PAGE, 200, page_with(DIRECT))
            .with(DIRECT, 200, "mp4-bytes");

        let result = PinDownloader::new(Arc::new(http), idle_tool())
            .download(PAGE, &output_dir, &JobId::new("job"))
            .await
            .unwrap();

        assert_eq!(result.file_path(), output_dir.join("job.mp4"));
        assert_eq!(std::fs::read(result.file_path()).unwrap(), b"mp4-bytes");
        assert_eq!(result.metadata().title.as_deref(), Some("Focaccia"));
    }

    #[tokio::test]
    async fn test_page_fetch_failure_message() {
        let dir = tempfile::tempdir().unwrap();
        let http = FakeTransport::new().with(PAGE, 500, "");

        let err = PinDownloader::new(Arc::new(http), idle_tool())
            .download(PAGE, dir.path(), &JobId::new("job"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::ExtractingCandidate);
        assert_eq!(err.to_string(), "Failed to fetch Pinterest page");
    }

    #[tokio::test]
    async fn test_short_link_failure_message() {
        let dir = tempfile::tempdir().unwrap();
        let http = FakeTransport::new().failing("https://pin.it/xyz");

        let err = PinDownloader::new(Arc::new(http), idle_tool())
            .download("https://pin.it/xyz", dir.path(), &JobId::new("job"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::ResolvingPage);
        assert_eq!(err.to_string(), "Invalid URL or network error");
    }

    #[tokio::test]
    async fn test_unresolvable_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let http = FakeTransport::new()
            .with(PAGE, 200, page_with(MANIFEST))
            .with(MANIFEST, 200, "#EXTM3U\n");

        let err = PinDownloader::new(Arc::new(http), idle_tool())
            .download(PAGE, dir.path(), &JobId::new("job"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::ResolvingStreams);
        assert_eq!(err.to_string(), NO_PLAYLIST_VIDEO);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_audio_failure_removes_video_track() {
        let dir = tempfile::tempdir().unwrap();
        // audio segment exists for HEAD but its GET body is empty
        let http = two_track_transport().with(AUDIO, 200, "");

        let err = PinDownloader::new(Arc::new(http), idle_tool())
            .download(PAGE, dir.path(), &JobId::new("job"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), AUDIO_TRACK_FAILED);
        assert!(!dir.path().join("job_video.mp4").exists());
        assert!(!dir.path().join("job_audio.mp4").exists());
    }

    #[tokio::test]
    async fn test_video_track_failure() {
        let dir = tempfile::tempdir().unwrap();
        let http = two_track_transport()
            .with(AUDIO, 200, "audio-bytes")
            .with(VIDEO, 200, "");

        let err = PinDownloader::new(Arc::new(http), idle_tool())
            .download(PAGE, dir.path(), &JobId::new("job"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Downloading);
        assert_eq!(err.to_string(), VIDEO_TRACK_FAILED);
    }

    #[tokio::test]
    async fn test_unavailable_mux_tool_falls_back_to_video_track() {
        let dir = tempfile::tempdir().unwrap();
        let http = two_track_transport().with(AUDIO, 200, "audio-bytes");
        let mut tool = MockMuxTool::new();
        tool.expect_probe().times(1).returning(|| false);
        tool.expect_run().never();

        let result = PinDownloader::new(Arc::new(http), Arc::new(tool))
            .download(PAGE, dir.path(), &JobId::new("job"))
            .await
            .unwrap();

        assert_eq!(result.file_path(), dir.path().join("job_video.mp4"));
        assert!(dir.path().join("job_audio.mp4").exists());
        assert!(!dir.path().join("job.mp4").exists());
    }
}
