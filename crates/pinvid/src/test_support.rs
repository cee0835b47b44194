use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::{
    error::TransportError,
    http::{HttpTransport, StreamResponse, TextResponse},
};

#[derive(Clone)]
enum Route {
    Respond(StatusCode, Bytes),
    Fail,
}

/// In-memory transport that serves canned responses and records every
/// request as `"<METHOD> <url>"`. Unknown URLs answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, status: u16, body: impl Into<Bytes>) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.routes
            .insert(url.to_string(), Route::Respond(status, body.into()));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Fail);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        let prefix = format!("{method} ");
        self.requests
            .lock()
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .count()
    }

    fn route(&self, method: &str, url: &str) -> Result<(StatusCode, Bytes), TransportError> {
        self.requests.lock().push(format!("{method} {url}"));
        match self.routes.get(url) {
            Some(Route::Respond(status, body)) => Ok((*status, body.clone())),
            Some(Route::Fail) => Err(TransportError::Other(format!("connection reset: {url}"))),
            None => Ok((StatusCode::NOT_FOUND, Bytes::new())),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get_text(&self, url: &str) -> Result<TextResponse, TransportError> {
        let (status, body) = self.route("GET", url)?;
        Ok(TextResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    async fn head(&self, url: &str) -> Result<StatusCode, TransportError> {
        self.route("HEAD", url).map(|(status, _)| status)
    }

    async fn get_stream(&self, url: &str) -> Result<StreamResponse, TransportError> {
        let (status, body) = self.route("GET", url)?;
        let content_length = Some(body.len() as u64);
        // split into small chunks so the fetcher sees more than one
        let chunks: Vec<Result<Bytes, TransportError>> = body
            .chunks(4)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(StreamResponse {
            status,
            content_length,
            body: stream::iter(chunks).boxed(),
        })
    }
}
