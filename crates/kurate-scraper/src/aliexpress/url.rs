//! Product id resolution and canonical product URLs.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::error::ScraperError;

static ITEM_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/item/(\d+)\.html").expect("valid regex"));

/// Tracking parameters sometimes embed the id as `x_object_id:{id}` inside
/// another value (e.g. `utparam-url`).
static OBJECT_ID_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"x_object_id[:=](\d+)").expect("valid regex"));

/// Whether the URL's host belongs to the marketplace (any regional domain or
/// subdomain, e.g. `www.aliexpress.com`, `aliexpress.us`, `fr.aliexpress.com`).
#[must_use]
pub fn is_aliexpress_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| host.split('.').any(|label| label == "aliexpress"))
}

/// Resolves the numeric product id, trying in order: the `/item/{id}.html`
/// path, the `productIds` query parameter, then `x_object_id`.
///
/// # Errors
///
/// [`ScraperError::InvalidProductUrl`] when the URL does not parse or none
/// of the shapes yields an id.
pub fn extract_product_id(url: &str) -> Result<String, ScraperError> {
    let invalid = |reason: &str| ScraperError::InvalidProductUrl {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };

    let parsed = Url::parse(url).map_err(|_| invalid("not an absolute URL"))?;

    if let Some(caps) = ITEM_PATH_RE.captures(parsed.path()) {
        return Ok(caps[1].to_owned());
    }

    let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

    let from_product_ids = pairs
        .iter()
        .filter(|(key, _)| key == "productIds")
        .flat_map(|(_, value)| value.split(','))
        .map(str::trim)
        .find(|candidate| is_numeric_id(candidate));
    if let Some(id) = from_product_ids {
        return Ok(id.to_owned());
    }

    let from_object_id = pairs.iter().find_map(|(key, value)| {
        if key == "x_object_id" && is_numeric_id(value.trim()) {
            return Some(value.trim().to_owned());
        }
        OBJECT_ID_TOKEN_RE
            .captures(value)
            .map(|caps| caps[1].to_owned())
    });

    from_object_id.ok_or_else(|| invalid("no product id in path or query"))
}

/// The single request shape every URL variant converges to.
#[must_use]
pub fn canonical_product_url(product_id: &str) -> String {
    format!("https://www.aliexpress.com/item/{product_id}.html")
}

fn is_numeric_id(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1005006123456789";

    #[test]
    fn item_path_yields_id() {
        let url = format!("https://www.aliexpress.com/item/{ID}.html?spm=a2g0o.home.0");
        assert_eq!(extract_product_id(&url).unwrap(), ID);
    }

    #[test]
    fn product_ids_param_takes_first_numeric_entry() {
        let url = format!(
            "https://www.aliexpress.com/gcp/300000512/nnmixupdatev3?productIds={ID}%2C1005000000000001"
        );
        assert_eq!(extract_product_id(&url).unwrap(), ID);
    }

    #[test]
    fn x_object_id_param_yields_id() {
        let url = format!("https://m.aliexpress.com/p/landing.html?x_object_id={ID}");
        assert_eq!(extract_product_id(&url).unwrap(), ID);
    }

    #[test]
    fn x_object_id_token_inside_tracking_value_yields_id() {
        let url = format!(
            "https://www.aliexpress.com/ssr/300000/deals?utparam-url=scene%3Asearch%7Cx_object_id%3A{ID}%7Cpos%3A3"
        );
        assert_eq!(extract_product_id(&url).unwrap(), ID);
    }

    #[test]
    fn all_shapes_converge_to_one_canonical_url() {
        let variants = [
            format!("https://www.aliexpress.com/item/{ID}.html"),
            format!("https://www.aliexpress.us/item/{ID}.html?gatewayAdapt=glo2usa"),
            format!("https://www.aliexpress.com/gcp/deals?productIds={ID}"),
            format!("https://www.aliexpress.com/p/landing.html?x_object_id={ID}"),
        ];

        let canonical: Vec<String> = variants
            .iter()
            .map(|url| canonical_product_url(&extract_product_id(url).unwrap()))
            .collect();

        assert!(canonical
            .iter()
            .all(|c| c == &format!("https://www.aliexpress.com/item/{ID}.html")));
    }

    #[test]
    fn path_wins_over_query() {
        let url = "https://www.aliexpress.com/item/111.html?productIds=222&x_object_id=333";
        assert_eq!(extract_product_id(url).unwrap(), "111");
    }

    #[test]
    fn url_without_id_is_invalid() {
        let err = extract_product_id("https://www.aliexpress.com/category/100003109/women.html")
            .unwrap_err();
        assert!(matches!(err, ScraperError::InvalidProductUrl { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn non_numeric_product_ids_are_ignored() {
        let err =
            extract_product_id("https://www.aliexpress.com/deals?productIds=abc,def").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidProductUrl { .. }));
    }

    #[test]
    fn garbage_input_is_invalid() {
        let err = extract_product_id("not-a-url").unwrap_err();
        assert!(
            matches!(err, ScraperError::InvalidProductUrl { ref reason, .. } if reason == "not an absolute URL")
        );
    }

    #[test]
    fn recognizes_regional_hosts() {
        assert!(is_aliexpress_url("https://www.aliexpress.com/item/1.html"));
        assert!(is_aliexpress_url("https://aliexpress.us/item/1.html"));
        assert!(is_aliexpress_url("https://fr.aliexpress.com/item/1.html"));
        assert!(is_aliexpress_url("https://aliexpress.ru/item/1.html"));
    }

    #[test]
    fn rejects_other_hosts() {
        assert!(!is_aliexpress_url("https://www.amazon.com/item/1.html"));
        assert!(!is_aliexpress_url("https://notaliexpress.com/item/1.html"));
        assert!(!is_aliexpress_url("not-a-url"));
    }
}
