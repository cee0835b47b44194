//! Pinterest video resolution and download.
//!
//! A page URL (optionally a `pin.it` short link) is resolved to a media
//! reference, HLS manifests are narrowed down to concrete video/audio
//! segment files, the streams are downloaded and, when audio comes as a
//! separate track, muxed back together with ffmpeg.

pub mod config;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod media;
pub mod metadata;
pub mod muxer;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{HttpConfig, MuxConfig, PinvidConfig};
pub use downloader::{DownloadResult, JobId, PinDownloader, Stage};
pub use error::{DownloadFailure, FetchError, MuxError, ResolveError, TransportError};
pub use http::{HttpTransport, ReqwestTransport};
pub use media::{MediaReference, PageMetadata, Quality, ResolveMethod, ResolvedStreams};
pub use muxer::{FfmpegTool, MuxTool, Muxer};
