//! Page metadata extraction.
//!
//! Each field is filled by its own ordered chain of tag lookups; the first
//! lookup that yields a value wins and a missing field is never an error.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::{media::PageMetadata, resolver::utils::first_match};

static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TWITTER_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="twitter:title"]"#).unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static KEYWORDS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="keywords"]"#).unwrap());

type FieldLookup = fn(&Html) -> Option<String>;

const TITLE_CHAIN: &[FieldLookup] = &[og_title, twitter_title, title_element];
const DESCRIPTION_CHAIN: &[FieldLookup] = &[og_description, meta_description];

pub fn extract_metadata(document: &Html) -> PageMetadata {
    PageMetadata {
        title: first_match(TITLE_CHAIN, document),
        description: first_match(DESCRIPTION_CHAIN, document),
        keywords: keywords(document),
    }
}

/// `content` of the first element matching `selector`, if non-empty.
fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_owned)
}

fn og_title(document: &Html) -> Option<String> {
    meta_content(document, &OG_TITLE)
}

fn twitter_title(document: &Html) -> Option<String> {
    meta_content(document, &TWITTER_TITLE)
}

fn title_element(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_owned())
}

fn og_description(document: &Html) -> Option<String> {
    meta_content(document, &OG_DESCRIPTION)
}

fn meta_description(document: &Html) -> Option<String> {
    meta_content(document, &DESCRIPTION)
}

fn keywords(document: &Html) -> Vec<String> {
    meta_content(document, &KEYWORDS)
        .map(|content| split_keywords(&content))
        .unwrap_or_default()
}

fn split_keywords(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_owned)
        .collect()
}
