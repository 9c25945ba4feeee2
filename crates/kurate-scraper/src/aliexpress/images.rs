//! Image URL cleaning and the gallery → description → fallback ladder.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// CDN resize/format suffixes appended after the real extension:
/// `foo.jpg_220x220.jpg`, `foo.jpg_.webp`, `foo.png_640x640q90.jpg_.avif`.
static RESIZE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?\.(?:jpe?g|png|webp|gif))_[^/]*$").expect("valid regex")
});

/// Source attributes of one `<img>` as read in the page. Empty string means
/// the attribute was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageCandidate {
    pub srcset: String,
    pub data_src: String,
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStrategy {
    Gallery,
    Description,
    Fallback,
}

impl ImageStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageStrategy::Gallery => "gallery",
            ImageStrategy::Description => "description",
            ImageStrategy::Fallback => "fallback",
        }
    }
}

/// Normalizes one raw URL. Returns `None` for blanks, `data:` URIs and
/// anything that is not an absolute http(s) URL after normalization.
#[must_use]
pub fn clean_image_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("data:") {
        return None;
    }

    let absolute = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_owned()
    };

    if !(absolute.starts_with("https://") || absolute.starts_with("http://")) {
        return None;
    }

    Some(strip_resize_suffix(&absolute).to_owned())
}

/// Drops everything after the real extension: `foo.jpg_220x220.jpg` → `foo.jpg`.
#[must_use]
pub fn strip_resize_suffix(url: &str) -> &str {
    RESIZE_SUFFIX_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map_or(url, |m| m.as_str())
}

/// URL of the last (highest-resolution) `srcset` entry, descriptor dropped.
fn last_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .next_back()
        .and_then(|entry| entry.split_whitespace().next())
}

/// Best URL for one candidate: `srcset`, then `data-src`, then `src`.
/// A source that cleans to nothing (lazy-load placeholder) falls through.
#[must_use]
pub fn resolve_candidate(candidate: &ImageCandidate) -> Option<String> {
    last_srcset_url(&candidate.srcset)
        .and_then(clean_image_url)
        .or_else(|| clean_image_url(&candidate.data_src))
        .or_else(|| clean_image_url(&candidate.src))
}

/// Resolved URLs in page order, deduplicated by cleaned URL.
#[must_use]
pub fn collect_images(candidates: &[ImageCandidate]) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter_map(resolve_candidate)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Walks the ladder and stops at the first strategy that yields any image.
#[must_use]
pub fn select_images(
    ladder: &[(ImageStrategy, &[ImageCandidate])],
) -> Option<(ImageStrategy, Vec<String>)> {
    ladder.iter().find_map(|(strategy, candidates)| {
        let images = collect_images(candidates);
        if images.is_empty() {
            tracing::debug!(strategy = strategy.as_str(), "image strategy yielded nothing");
            None
        } else {
            Some((*strategy, images))
        }
    })
}
