//! Everything that depends on the shape of the site's HTML.
//!
//! Selectors, attribute names and text patterns are kept here so that a
//! redesign of the site only touches this module.

use std::path::Path;
use std::sync::LazyLock;

use engine_logging::engine_warn;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::filename::{fallback_base_name, photo_filename, recover_base_name};
use crate::PhotoStub;

pub const PHOTO_ANCHOR_SELECTOR: &str = "a.fcx-detail-link.fcx-show-detail";
pub const PREVIEW_IMAGE_SELECTOR: &str = "img[data-src]";
pub const PREVIEW_SRC_ATTR: &str = "data-src";
pub const CONTENT_ID_ATTR: &str = "data-id";
pub const TITLE_ATTR: &str = "alt";
pub const PAGINATION_SELECTOR: &str = "div.fcx-pagination";
pub const LINK_SELECTOR: &str = "a[href]";
pub const PAGINATION_PATTERN: &str = r"Seite\s+(\d+)\s+von\s+(\d+)";
pub const ACCOUNT_ID_PATTERN: &str = r"\[fc-user:(\d+)\]";

static PAGINATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PAGINATION_PATTERN).expect("pagination pattern is valid"));
static ACCOUNT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ACCOUNT_ID_PATTERN).expect("account id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("invalid selector {0}")]
    Selector(String),
    #[error("no pagination information available")]
    MissingPagination,
    #[error("failed to process pagination info: {0:?}")]
    UnparsablePagination(String),
    #[error("photo anchor {index} on page is malformed: {reason}")]
    InvalidStub { index: usize, reason: String },
}

/// The "Seite X von Y" marker of a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
}

impl Pagination {
    /// Next page to fetch, or `None` once the last page has been seen.
    pub fn next_page(&self) -> Option<u32> {
        (self.current < self.total).then(|| self.current + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub stubs: Vec<PhotoStub>,
    pub next_page: Option<u32>,
}

pub fn extract_account_id(body: &str) -> Option<u64> {
    ACCOUNT_ID_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn parse_pagination(text: &str) -> Option<Pagination> {
    let caps = PAGINATION_RE.captures(text)?;
    Some(Pagination {
        current: caps.get(1)?.as_str().parse().ok()?,
        total: caps.get(2)?.as_str().parse().ok()?,
    })
}

/// Extract the photo stubs and pagination marker of one listing page.
///
/// Stub counters start at `first_counter` and follow document order.
pub fn parse_listing_page(
    html: &str,
    first_counter: usize,
    out_dir: &Path,
    top_url: &Url,
) -> Result<ListingPage, MarkupError> {
    let doc = Html::parse_document(html);
    let anchor_sel = selector(PHOTO_ANCHOR_SELECTOR)?;
    let preview_sel = selector(PREVIEW_IMAGE_SELECTOR)?;

    let stubs = doc
        .select(&anchor_sel)
        .enumerate()
        .map(|(index, anchor)| {
            extract_stub(anchor, &preview_sel, first_counter + index, out_dir, top_url)
                .map_err(|reason| MarkupError::InvalidStub { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pagination = find_pagination(&doc)?;

    Ok(ListingPage {
        stubs,
        next_page: pagination.next_page(),
    })
}

/// First link on a detail page whose target starts with `origin_prefix`, verbatim.
pub fn find_original_url(html: &str, origin_prefix: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let link_sel = selector(LINK_SELECTOR).ok()?;
    doc.select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with(origin_prefix))
        .map(str::to_string)
}

fn find_pagination(doc: &Html) -> Result<Pagination, MarkupError> {
    let sel = selector(PAGINATION_SELECTOR)?;
    let marker = doc
        .select(&sel)
        .next()
        .ok_or(MarkupError::MissingPagination)?;
    let text = marker.text().collect::<Vec<_>>().join(" ");
    parse_pagination(&text).ok_or_else(|| MarkupError::UnparsablePagination(text.trim().to_string()))
}

fn extract_stub(
    anchor: ElementRef,
    preview_sel: &Selector,
    counter: usize,
    out_dir: &Path,
    top_url: &Url,
) -> Result<PhotoStub, String> {
    let href = anchor
        .value()
        .attr("href")
        .ok_or("missing href")?
        .trim();
    let page_url = top_url
        .join(href)
        .map_err(|err| format!("bad href {href:?}: {err}"))?;

    let content_id = anchor
        .value()
        .attr(CONTENT_ID_ATTR)
        .ok_or("missing data-id")?;
    let content_id = content_id
        .trim()
        .parse::<u64>()
        .map_err(|err| format!("bad data-id {content_id:?}: {err}"))?;

    let image = anchor
        .select(preview_sel)
        .next()
        .ok_or("missing preview image")?;
    let title = image
        .value()
        .attr(TITLE_ATTR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let data_src = image
        .value()
        .attr(PREVIEW_SRC_ATTR)
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .ok_or("missing preview url")?;
    let mut preview = top_url
        .join(data_src)
        .map_err(|err| format!("bad preview url {data_src:?}: {err}"))?;

    let raw_name = raw_basename(&preview);
    if raw_name.is_empty() {
        return Err(format!("preview url {data_src:?} has no file name"));
    }
    preview.set_query(None);
    let origin_prefix = preview.to_string();

    let base = match recover_base_name(&raw_name) {
        Some(base) => base,
        None => {
            engine_warn!(
                "Preview name {:?} too short to strip hash suffix, using it as is",
                raw_name
            );
            fallback_base_name(&raw_name)
        }
    };

    Ok(PhotoStub {
        counter,
        page_url: page_url.to_string(),
        target_path: out_dir.join(photo_filename(counter, base)),
        origin_prefix,
        content_id,
        title,
    })
}

/// Decoded final path segment, with path separators neutralised.
fn raw_basename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    decoded.replace(['/', '\\'], "_")
}

fn selector(css: &str) -> Result<Selector, MarkupError> {
    Selector::parse(css).map_err(|_| MarkupError::Selector(css.to_string()))
}
