use std::path::Path;

use futures::StreamExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, instrument};

use crate::{error::FetchError, http::HttpTransport};

/// Stream `url` into `dest`, returning the number of bytes written.
///
/// A non-success status never creates the file. A success status with an
/// empty body removes the (empty) file again. A transport error in the middle
/// of the body leaves the partial file for the caller; the byte count is not
/// checked against `Content-Length`.
#[instrument(skip(http, dest), fields(dest = %dest.display()))]
pub async fn download_file(
    http: &dyn HttpTransport,
    url: &str,
    dest: &Path,
) -> Result<u64, FetchError> {
    let response = http.get_stream(url).await?;
    if !response.status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    debug!(content_length = ?response.content_length, "streaming response body");

    let mut file = File::create(dest).await?;
    let mut body = response.body;
    let mut written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    if written == 0 {
        tokio::fs::remove_file(dest).await?;
        return Err(FetchError::Empty {
            url: url.to_string(),
        });
    }

    debug!(bytes = written, "download complete");
    Ok(written)
}
