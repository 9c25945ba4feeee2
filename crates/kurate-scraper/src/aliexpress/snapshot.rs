//! The data contract between in-page extraction and Rust.
//!
//! [`PAGE_SNAPSHOT_SCRIPT`] runs inside the rendered product page and only
//! reads the DOM. Everything it returns is plain strings and arrays, so no
//! DOM handle crosses the boundary. All interpretation (title cleanup, price
//! matching, image cleaning) happens in [`build_scrape_result`].

use std::sync::LazyLock;

use kurate_core::ScrapeResult;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::images::{select_images, ImageCandidate, ImageStrategy};
use crate::error::ScraperError;

/// Main gallery container; waited on and hovered during settling.
pub(crate) const GALLERY_SELECTOR: &str =
    "[class*='slider--wrap'], [class*='image-view--wrap'], .images-view-wrap";

/// Gallery thumbnails; hovering each one swaps the main image in and makes
/// the full-size URL appear in the DOM.
pub(crate) const THUMBNAIL_SELECTOR: &str =
    "[class*='slider--item'], [class*='images-view-item'], .images-view-list li";

/// Returns a JSON object matching [`PageSnapshot`].
pub const PAGE_SNAPSHOT_SCRIPT: &str = r##"(() => {
  const clean = (value) => (value || '').replace(/\s+/g, ' ').trim();
  const textOf = (el) => (el ? clean(el.innerText || el.textContent) : '');
  const first = (selector) => textOf(document.querySelector(selector));
  const all = (selector) => Array.from(document.querySelectorAll(selector));
  const images = (selector) => all(selector).map((img) => ({
    srcset: img.getAttribute('srcset') || '',
    dataSrc: img.getAttribute('data-src') || '',
    src: img.getAttribute('src') || '',
  }));
  const meta = document.querySelector('meta[name="description"], meta[property="og:description"]');
  return {
    heading: first('h1'),
    documentTitle: clean(document.title),
    descriptionCandidates: [
      first('#product-description'),
      first('[class*="description--origin-part"]'),
      first('[class*="product-description"]'),
      first('.detail-desc-decorate-richtext'),
    ],
    specification: all('[class*="specification--prop"], .product-specs-list li')
      .map(textOf)
      .filter(Boolean)
      .join('\n'),
    metaDescription: meta ? clean(meta.getAttribute('content')) : '',
    priceTexts: all('[class*="price--current"], [class*="price-default--current"], [class*="product-price-value"], [class*="price"]')
      .slice(0, 40)
      .map(textOf)
      .filter(Boolean),
    breadcrumbs: all('[class*="breadcrumb"] a, nav[aria-label="breadcrumb"] a')
      .map(textOf)
      .filter(Boolean),
    galleryImages: images('[class*="slider--wrap"] img, [class*="image-view--wrap"] img, .images-view-wrap img'),
    descriptionImages: images('#product-description img, [class*="description--origin-part"] img, .detail-desc-decorate-richtext img'),
    fallbackImages: images('img[src*="alicdn"], img[data-src*="alicdn"], img[srcset*="alicdn"]'),
  };
})()"##;

/// Marketplace branding appended to the document title:
/// `"Foo Bar - AliExpress 44"`, `"Foo Bar | AliExpress"`. A bare
/// `"AliExpress"` title reduces to nothing.
static TITLE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s*[-|]\s*)aliexpress\b.*$").expect("valid regex")
});

/// A displayed price: `US $12.99`, `$3`, `€ 4,50`, `12,99€`, `1 299 ₽`.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:[A-Z]{2,3}\s?)?[$€£¥₩₹]\s?\d[\d.,\s]*\d|(?:[A-Z]{2,3}\s?)?[$€£¥₩₹]\s?\d|\d[\d.,\s]*\s?(?:€|₽|zł|руб))",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSnapshot {
    pub heading: String,
    pub document_title: String,
    /// Description containers in preference order; empty when not rendered.
    pub description_candidates: Vec<String>,
    pub specification: String,
    pub meta_description: String,
    pub price_texts: Vec<String>,
    pub breadcrumbs: Vec<String>,
    pub gallery_images: Vec<ImageCandidate>,
    pub description_images: Vec<ImageCandidate>,
    pub fallback_images: Vec<ImageCandidate>,
}

/// Where the snapshot came from; recorded in the result metadata.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotOrigin<'a> {
    pub product_id: &'a str,
    pub canonical_url: &'a str,
    pub source_url: &'a str,
}

/// Interprets a snapshot.
///
/// # Errors
///
/// [`ScraperError::Extraction`] when neither the heading nor the document
/// title yields a product name (block page, captcha, removed listing).
pub fn build_scrape_result(
    snapshot: &PageSnapshot,
    origin: SnapshotOrigin<'_>,
) -> Result<ScrapeResult, ScraperError> {
    let name = product_name(snapshot).ok_or_else(|| ScraperError::Extraction {
        url: origin.canonical_url.to_owned(),
        reason: "page has no product title".to_owned(),
    })?;

    let selected = select_images(&[
        (ImageStrategy::Gallery, snapshot.gallery_images.as_slice()),
        (
            ImageStrategy::Description,
            snapshot.description_images.as_slice(),
        ),
        (ImageStrategy::Fallback, snapshot.fallback_images.as_slice()),
    ]);
    let (image_strategy, images) = match selected {
        Some((strategy, images)) => (Some(strategy.as_str()), images),
        None => (None, Vec::new()),
    };

    Ok(ScrapeResult {
        name,
        description: description(snapshot),
        price_text: price_text(&snapshot.price_texts),
        images,
        category: category(&snapshot.breadcrumbs),
        external_id: Some(origin.product_id.to_owned()),
        metadata: Some(json!({
            "productId": origin.product_id,
            "canonicalUrl": origin.canonical_url,
            "sourceUrl": origin.source_url,
            "imageStrategy": image_strategy,
        })),
    })
}

fn product_name(snapshot: &PageSnapshot) -> Option<String> {
    let heading = snapshot.heading.trim();
    if !heading.is_empty() {
        return Some(heading.to_owned());
    }
    let title = TITLE_SUFFIX_RE.replace(snapshot.document_title.trim(), "");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_owned())
}

/// First rendered description container, then the specification block,
/// then the meta description.
fn description(snapshot: &PageSnapshot) -> Option<String> {
    snapshot
        .description_candidates
        .iter()
        .map(String::as_str)
        .chain([
            snapshot.specification.as_str(),
            snapshot.meta_description.as_str(),
        ])
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}

fn price_text(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find_map(|text| PRICE_RE.find(text))
        .map(|m| m.as_str().trim().to_owned())
}

/// The second-to-last breadcrumb; the last one is the product itself.
fn category(breadcrumbs: &[String]) -> Option<String> {
    if breadcrumbs.len() < 2 {
        return None;
    }
    let crumb = breadcrumbs[breadcrumbs.len() - 2].trim();
    (!crumb.is_empty()).then(|| crumb.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: SnapshotOrigin<'static> = SnapshotOrigin {
        product_id: "1005006123456789",
        canonical_url: "https://www.aliexpress.com/item/1005006123456789.html",
        source_url: "https://www.aliexpress.com/item/1005006123456789.html?spm=x",
    };

    fn full_snapshot() -> PageSnapshot {
        serde_json::from_value(json!({
            "heading": "  Nordic Ceramic Vase  ",
            "documentTitle": "Nordic Ceramic Vase - AliExpress 15",
            "descriptionCandidates": ["", "Hand-glazed stoneware vase."],
            "specification": "Material: Ceramic",
            "metaDescription": "Cheap vases",
            "priceTexts": ["Sale", "US $12.99", "US $25.00"],
            "breadcrumbs": ["Home", "Home & Garden", "Vases", "Nordic Ceramic Vase"],
            "galleryImages": [
                {"srcset": "", "dataSrc": "", "src": "//ae01.alicdn.com/kf/vase1.jpg_220x220.jpg"},
                {"srcset": "", "dataSrc": "", "src": "//ae01.alicdn.com/kf/vase1.jpg_50x50.jpg"},
                {"srcset": "", "dataSrc": "", "src": "https://ae01.alicdn.com/kf/vase2.png_.webp"}
            ],
            "descriptionImages": [
                {"srcset": "", "dataSrc": "", "src": "https://ae01.alicdn.com/kf/detail.jpg"}
            ],
            "fallbackImages": []
        }))
        .unwrap()
    }

    #[test]
    fn builds_full_result() {
        let result = build_scrape_result(&full_snapshot(), ORIGIN).unwrap();

        assert_eq!(result.name, "Nordic Ceramic Vase");
        assert_eq!(
            result.description.as_deref(),
            Some("Hand-glazed stoneware vase.")
        );
        assert_eq!(result.price_text.as_deref(), Some("US $12.99"));
        assert_eq!(result.category.as_deref(), Some("Vases"));
        assert_eq!(result.external_id.as_deref(), Some("1005006123456789"));
        assert_eq!(
            result.images,
            vec![
                "https://ae01.alicdn.com/kf/vase1.jpg".to_owned(),
                "https://ae01.alicdn.com/kf/vase2.png".to_owned(),
            ]
        );

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata["imageStrategy"], "gallery");
        assert_eq!(
            metadata["canonicalUrl"],
            "https://www.aliexpress.com/item/1005006123456789.html"
        );
    }

    #[test]
    fn title_falls_back_to_document_title_without_suffix() {
        let snapshot = PageSnapshot {
            document_title: "Bamboo Cutting Board | AliExpress".to_owned(),
            ..PageSnapshot::default()
        };
        let result = build_scrape_result(&snapshot, ORIGIN).unwrap();
        assert_eq!(result.name, "Bamboo Cutting Board");
    }

    #[test]
    fn missing_title_is_an_extraction_error() {
        let snapshot = PageSnapshot {
            document_title: "AliExpress".to_owned(),
            ..PageSnapshot::default()
        };
        let err = build_scrape_result(&snapshot, ORIGIN).unwrap_err();
        assert!(matches!(err, ScraperError::Extraction { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn description_falls_back_to_specification_then_meta() {
        let mut snapshot = PageSnapshot {
            heading: "Lamp".to_owned(),
            description_candidates: vec![String::new(), "   ".to_owned()],
            specification: "Power: 5W\nColor: White".to_owned(),
            meta_description: "Buy lamps".to_owned(),
            ..PageSnapshot::default()
        };
        assert_eq!(
            description(&snapshot).as_deref(),
            Some("Power: 5W\nColor: White")
        );

        snapshot.specification.clear();
        assert_eq!(description(&snapshot).as_deref(), Some("Buy lamps"));

        snapshot.meta_description.clear();
        assert_eq!(description(&snapshot), None);
    }

    #[test]
    fn price_skips_non_price_text() {
        let candidates = vec![
            "Price".to_owned(),
            "-50%".to_owned(),
            "€ 4,50".to_owned(),
        ];
        assert_eq!(price_text(&candidates).as_deref(), Some("€ 4,50"));
        assert_eq!(price_text(&["Free shipping".to_owned()]), None);
    }

    #[test]
    fn price_accepts_single_digit_amounts() {
        assert_eq!(price_text(&["$3".to_owned()]).as_deref(), Some("$3"));
    }

    #[test]
    fn category_needs_two_breadcrumbs() {
        assert_eq!(category(&["Home".to_owned()]), None);
        assert_eq!(
            category(&["Home".to_owned(), "Kitchen".to_owned(), "Mug".to_owned()]).as_deref(),
            Some("Kitchen")
        );
    }

    #[test]
    fn no_images_is_not_an_error() {
        let snapshot = PageSnapshot {
            heading: "Socks".to_owned(),
            ..PageSnapshot::default()
        };
        let result = build_scrape_result(&snapshot, ORIGIN).unwrap();
        assert!(result.images.is_empty());
        assert!(result.metadata.unwrap()["imageStrategy"].is_null());
    }

    #[test]
    fn snapshot_tolerates_missing_keys() {
        let snapshot: PageSnapshot = serde_json::from_value(json!({"heading": "Only"})).unwrap();
        assert_eq!(snapshot.heading, "Only");
        assert!(snapshot.gallery_images.is_empty());
    }
}
