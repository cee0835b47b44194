pub const MANIFEST_SUFFIX: &str = ".m3u8";

/// A located media URL, tagged by whether it points at an HLS manifest or
/// directly at a media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaReference {
    Manifest(String),
    Direct(String),
}

impl MediaReference {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        if url.ends_with(MANIFEST_SUFFIX) {
            Self::Manifest(url)
        } else {
            Self::Direct(url)
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Manifest(url) | Self::Direct(url) => url,
        }
    }

    pub fn is_manifest(&self) -> bool {
        matches!(self, Self::Manifest(_))
    }
}
