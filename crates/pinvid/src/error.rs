use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::downloader::Stage;

/// Failure of the underlying HTTP transport (connection, TLS, body read).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{context} ({url} returned HTTP {status})")]
    Network {
        context: &'static str,
        url: String,
        status: StatusCode,
    },
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    NotFound(String),
}

impl ResolveError {
    /// Message shown to the caller. Network failures collapse to the stage's
    /// fixed message; the url and status only go to the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { context, .. } | Self::Transport { context, .. } => context.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("no bytes received from {url}")]
    Empty { url: String },
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("mux tool is not available")]
    ToolUnavailable,
    #[error("mux tool failed to produce {}", .output.display())]
    ToolFailed { output: PathBuf },
}

/// Terminal failure of a download invocation.
///
/// Only the message crosses the external boundary; the stage is kept for logs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DownloadFailure {
    pub stage: Stage,
    pub message: String,
}

impl DownloadFailure {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}
