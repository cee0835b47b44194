//! HLS manifest resolution.
//!
//! Pinterest serves video as fMP4 HLS with separate audio. Three strategies
//! are tried in order, each one only when the previous produced no video:
//!
//! 1. Rewrite the manifest URL into the progressive 720p MP4 URL.
//! 2. Parse the master playlist: audio from the `_audio.m3u8` rendition,
//!    video from the best advertised width variant.
//! 3. Take any absolute `.mp4` URL listed in the master playlist.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::{
    http::HttpTransport,
    media::{Quality, ResolvedStreams},
    resolver::utils::{capture_group_1, first_line_ending_with, resolve_reference},
};

static AUDIO_PLAYLIST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"URI="([^"]*_audio\.m3u8)""#).unwrap());

const AUDIO_SEGMENT_SUFFIX: &str = ".cmfa";
const VIDEO_SEGMENT_SUFFIX: &str = ".cmfv";
const SIMPLE_QUALITY_LABEL: &str = "720p";

pub struct ManifestResolver {
    http: Arc<dyn HttpTransport>,
}

impl ManifestResolver {
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, manifest_url: &str) -> ResolvedStreams {
        let simple_url = rewrite_to_progressive(manifest_url);
        if self.http.exists(&simple_url).await {
            info!(url = %simple_url, "using progressive rewrite");
            return ResolvedStreams::simple(simple_url);
        }

        let Some(manifest) = self.fetch_playlist(manifest_url).await else {
            return ResolvedStreams::failed();
        };
        let Ok(base) = Url::parse(manifest_url) else {
            warn!("manifest url is not absolute");
            return ResolvedStreams::failed();
        };

        let audio_url = self.find_audio(&manifest, &base).await;
        if let Some(video_url) = self.find_video(&manifest, manifest_url, &base).await {
            info!(video = %video_url, audio = ?audio_url, "resolved streams from manifest");
            return ResolvedStreams::hls(video_url, audio_url);
        }

        if let Some(video_url) = self.scan_for_mp4(&manifest).await {
            info!(video = %video_url, "resolved progressive file listed in manifest");
            return ResolvedStreams::hls(video_url, None);
        }

        debug!("no downloadable stream in manifest");
        ResolvedStreams::failed()
    }

    /// Audio rendition: `URI="…_audio.m3u8"` → first `.cmfa` line → HEAD.
    /// Every failure here only means "no audio".
    async fn find_audio(&self, manifest: &str, base: &Url) -> Option<String> {
        let playlist_ref = capture_group_1(&AUDIO_PLAYLIST_REGEX, manifest)?;
        let playlist_url = resolve_reference(base, playlist_ref)?;
        let playlist = self.fetch_playlist(&playlist_url).await?;

        let segment = first_line_ending_with(&playlist, AUDIO_SEGMENT_SUFFIX)?;
        let segment_url = resolve_reference(base, segment)?;
        self.http
            .exists(&segment_url)
            .await
            .then_some(segment_url)
    }

    /// Video variant: only the best width advertised by the master playlist
    /// is attempted. If its sub-playlist leads nowhere the lower widths are
    /// not retried.
    async fn find_video(&self, manifest: &str, manifest_url: &str, base: &Url) -> Option<String> {
        let quality = Quality::ALL
            .into_iter()
            .find(|quality| manifest.contains(&quality.marker()))?;
        debug!(%quality, "selected variant");

        let manifest_name = manifest_url.rsplit('/').next().unwrap_or(manifest_url);
        let variant_url = resolve_reference(base, &quality.sub_manifest_name(manifest_name))?;
        let playlist = self.fetch_playlist(&variant_url).await?;

        let segment = first_line_ending_with(&playlist, VIDEO_SEGMENT_SUFFIX)?;
        let segment_url = resolve_reference(base, segment)?;
        self.http
            .exists(&segment_url)
            .await
            .then_some(segment_url)
    }

    /// Last resort: the first absolute line mentioning `.mp4`.
    async fn scan_for_mp4(&self, manifest: &str) -> Option<String> {
        let candidate = manifest
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("http") && line.contains(".mp4"))?;
        self.http
            .exists(candidate)
            .await
            .then(|| candidate.to_string())
    }

    async fn fetch_playlist(&self, url: &str) -> Option<String> {
        match self.http.get_text(url).await {
            Ok(response) if response.status.is_success() => Some(response.body),
            Ok(response) => {
                debug!(url, status = %response.status, "playlist request rejected");
                None
            }
            Err(e) => {
                debug!(url, error = %e, "playlist request failed");
                None
            }
        }
    }
}

/// `…/hls/….m3u8` → `…/720p/….mp4`
pub fn rewrite_to_progressive(manifest_url: &str) -> String {
    manifest_url
        .replace("hls", SIMPLE_QUALITY_LABEL)
        .replace("m3u8", "mp4")
}
