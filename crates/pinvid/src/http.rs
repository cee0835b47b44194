//! HTTP transport seam.
//!
//! The resolvers and the fetcher only talk to [`HttpTransport`], which keeps
//! them testable against canned responses. [`ReqwestTransport`] is the real
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;

use crate::{config::HttpConfig, error::TransportError};

pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

#[derive(Debug, Clone)]
pub struct TextResponse {
    pub status: StatusCode,
    pub body: String,
}

pub struct StreamResponse {
    pub status: StatusCode,
    /// Value of the `Content-Length` header, if the server sent one.
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET a resource and buffer its body as text.
    async fn get_text(&self, url: &str) -> Result<TextResponse, TransportError>;

    /// HEAD a resource, returning only its status.
    async fn head(&self, url: &str) -> Result<StatusCode, TransportError>;

    /// GET a resource without buffering the body.
    async fn get_stream(&self, url: &str) -> Result<StreamResponse, TransportError>;

    /// Existence check: a HEAD request answered with a success status.
    /// Transport failures count as "does not exist".
    async fn exists(&self, url: &str) -> bool {
        match self.head(url).await {
            Ok(status) => {
                debug!(url, %status, "existence check");
                status.is_success()
            }
            Err(e) => {
                debug!(url, error = %e, "existence check failed");
                false
            }
        }
    }
}

/// reqwest-backed transport.
///
/// GETs follow redirects. HEAD requests do not: an existence check only
/// passes when the URL itself answers with a success status.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    head_client: Client,
}

impl ReqwestTransport {
    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = Self::builder(config).build()?;
        let head_client = Self::builder(config)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            head_client,
        })
    }

    fn builder(config: &HttpConfig) -> ClientBuilder {
        let mut builder = Client::builder().user_agent(config.user_agent());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_text(&self, url: &str) -> Result<TextResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(TextResponse { status, body })
    }

    async fn head(&self, url: &str) -> Result<StatusCode, TransportError> {
        let response = self.head_client.head(url).send().await?;
        Ok(response.status())
    }

    async fn get_stream(&self, url: &str) -> Result<StreamResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from))
            .boxed();
        Ok(StreamResponse {
            status,
            content_length,
            body,
        })
    }
}
