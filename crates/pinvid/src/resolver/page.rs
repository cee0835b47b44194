//! Page-level resolution: short-link expansion, page scraping and media
//! candidate search.
//!
//! HTML is parsed inside the synchronous helpers below and dropped before any
//! request is awaited; `scraper::Html` is not `Send`.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

use crate::{
    error::ResolveError,
    http::HttpTransport,
    media::{MediaReference, PageMetadata},
    metadata::extract_metadata,
    resolver::utils::{capture_group_1, first_capture_or_match, first_match},
};

pub static SHORT_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://pin\.it/").unwrap());
static SHARE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"url=(.*?)&").unwrap());

/// Known shapes of embedded media URLs, tried in this order.
static EMBEDDED_URL_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r#"https://v1\.pinimg\.com/videos/[^"']*\.m3u8"#).unwrap(),
        Regex::new(r#"https://v1\.pinimg\.com/videos/[^"']*\.mp4"#).unwrap(),
        Regex::new(r#""videoUrl":"([^"]*)""#).unwrap(),
        Regex::new(r#""video_url":"([^"]*)""#).unwrap(),
    ]
});

static ALTERNATE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel~="alternate"]"#).unwrap());
static SIGNATURE_VIDEO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"video[class="hwa kVc MIw L4E"]"#).unwrap());
static ANY_VIDEO: LazyLock<Selector> = LazyLock::new(|| Selector::parse("video").unwrap());

const CANDIDATE_CHAIN: &[fn(&Html) -> Option<String>] =
    &[signature_video_src, first_video_src, embedded_url];

const SHORT_LINK_FAILED: &str = "Invalid URL or network error";
const PAGE_FETCH_FAILED: &str = "Failed to fetch Pinterest page";
const NO_VIDEO_URL: &str = "Could not find video URL on Pinterest page";

/// What a canonical page yielded: its metadata and the media candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScan {
    pub metadata: PageMetadata,
    pub candidate: MediaReference,
}

pub fn is_short_link(url: &str) -> bool {
    SHORT_LINK_REGEX.is_match(url)
}

pub struct PageResolver {
    http: Arc<dyn HttpTransport>,
}

impl PageResolver {
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }

    /// Follow a `pin.it` short link to the canonical page URL.
    #[instrument(skip(self))]
    pub async fn expand_short_link(&self, short_url: &str) -> Result<String, ResolveError> {
        let body = self.fetch_page(short_url, SHORT_LINK_FAILED).await?;
        let canonical = canonical_url_from_share_page(&body)?;
        info!(canonical = %canonical, "expanded short link");
        Ok(canonical)
    }

    /// Fetch a canonical page and locate its metadata and media candidate.
    #[instrument(skip(self))]
    pub async fn scan(&self, page_url: &str) -> Result<PageScan, ResolveError> {
        let body = self.fetch_page(page_url, PAGE_FETCH_FAILED).await?;
        let (metadata, candidate) = scan_document(&body);
        let candidate = candidate.ok_or_else(|| ResolveError::NotFound(NO_VIDEO_URL.to_string()))?;
        debug!(candidate = %candidate, "found media candidate");

        Ok(PageScan {
            metadata,
            candidate: MediaReference::from_url(candidate),
        })
    }

    async fn fetch_page(&self, url: &str, context: &'static str) -> Result<String, ResolveError> {
        let response = self
            .http
            .get_text(url)
            .await
            .map_err(|source| ResolveError::Transport { context, source })?;

        if !response.status.is_success() {
            return Err(ResolveError::Network {
                context,
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

/// Pull the canonical page URL out of the `url=` parameter of the share
/// page's alternate link.
pub fn canonical_url_from_share_page(body: &str) -> Result<String, ResolveError> {
    let document = Html::parse_document(body);
    let href = document
        .select(&ALTERNATE_LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .ok_or_else(|| ResolveError::Parse("short link page has no alternate link".to_string()))?;

    let encoded = capture_group_1(&SHARE_URL_REGEX, href)
        .ok_or_else(|| ResolveError::Parse(format!("no url= parameter in {href}")))?;

    urlencoding::decode(encoded)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ResolveError::Parse(format!("malformed url= parameter: {e}")))
}

/// Parse a page once, returning its metadata and the first media candidate.
pub fn scan_document(body: &str) -> (PageMetadata, Option<String>) {
    let document = Html::parse_document(body);
    let metadata = extract_metadata(&document);
    let candidate = first_match(CANDIDATE_CHAIN, &document);
    (metadata, candidate)
}

fn non_empty_src(element: scraper::ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("src")
        .filter(|src| !src.is_empty())
        .map(str::to_owned)
}

fn signature_video_src(document: &Html) -> Option<String> {
    document.select(&SIGNATURE_VIDEO).next().and_then(non_empty_src)
}

fn first_video_src(document: &Html) -> Option<String> {
    document.select(&ANY_VIDEO).next().and_then(non_empty_src)
}

fn embedded_url(document: &Html) -> Option<String> {
    scan_embedded_urls(&document.html())
}

/// Regex scan of serialized page text. The first pattern with any match
/// decides; an empty match there ends the search without a result.
pub fn scan_embedded_urls(text: &str) -> Option<String> {
    EMBEDDED_URL_PATTERNS
        .iter()
        .find_map(|re| first_capture_or_match(re, text))
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
}
