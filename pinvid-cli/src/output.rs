//! The single JSON document printed on stdout.

use std::path::Path;

use pinvid::{DownloadResult, PageMetadata};
use serde::Serialize;

pub const USAGE: &str = "Usage: pinvid <url> <output_dir>";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Success<'a> {
    success: bool,
    file_path: &'a Path,
    metadata: &'a PageMetadata,
}

#[derive(Serialize)]
struct Failure<'a> {
    success: bool,
    error: &'a str,
}

#[derive(Serialize)]
struct UsageError<'a> {
    error: &'a str,
    details: &'a str,
}

pub struct OutputManager {
    pretty: bool,
}

impl OutputManager {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn success(&self, result: &DownloadResult) -> String {
        self.render(&Success {
            success: true,
            file_path: result.file_path(),
            metadata: result.metadata(),
        })
    }

    pub fn failure(&self, error: &str) -> String {
        self.render(&Failure {
            success: false,
            error,
        })
    }

    pub fn usage(&self, details: &str) -> String {
        self.render(&UsageError {
            error: USAGE,
            details,
        })
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        // only paths can fail to serialize (non UTF-8); fall back to a plain failure
        rendered.unwrap_or_else(|e| {
            format!(
                r#"{{"success":false,"error":{}}}"#,
                serde_json::Value::String(format!("Failed to render result: {e}"))
            )
        })
    }
}
