//! Cross-boundary shapes produced by marketplace adapters.

use serde::{Deserialize, Serialize};

/// Structured data extracted from one marketplace product page.
///
/// Produced once per successful extraction; ownership passes to the
/// persistence layer as a scraped product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub name: String,
    /// May be absent when no description container rendered.
    pub description: Option<String>,
    /// Price as displayed on the page, currency symbol included (e.g. `"US $12.99"`).
    pub price_text: Option<String>,
    /// Cleaned, deduplicated, highest-resolution image URLs in page order.
    pub images: Vec<String>,
    pub category: Option<String>,
    /// Marketplace-native product identifier.
    pub external_id: Option<String>,
    /// Adapter-specific extras (canonical URL, image strategy, ...).
    pub metadata: Option<serde_json::Value>,
}

/// One customer review collected from a marketplace feedback feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewScrapeResult {
    pub text: String,
    /// Star rating in `1..=5`.
    pub rating: u8,
    pub author_name: Option<String>,
    pub author_country: Option<String>,
    /// Review date as the source renders it; not parsed.
    pub review_date: Option<String>,
    pub images: Vec<String>,
    /// ISO 639-1 code guessed from the review text.
    pub original_language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_result_serializes_camel_case() {
        let result = ScrapeResult {
            name: "Ceramic Mug".to_string(),
            description: None,
            price_text: Some("US $4.20".to_string()),
            images: vec!["https://ae01.alicdn.com/kf/a.jpg".to_string()],
            category: Some("Kitchen".to_string()),
            external_id: Some("1005001234567890".to_string()),
            metadata: None,
        };

        let value = serde_json::to_value(&result).expect("serialization failed");
        assert_eq!(value["priceText"], "US $4.20");
        assert_eq!(value["externalId"], "1005001234567890");
        assert!(value["description"].is_null());
    }

    #[test]
    fn review_result_serializes_camel_case() {
        let review = ReviewScrapeResult {
            text: "Great quality".to_string(),
            rating: 5,
            author_name: Some("Verified Buyer".to_string()),
            author_country: Some("US".to_string()),
            review_date: None,
            images: vec![],
            original_language: Some("en".to_string()),
        };

        let value = serde_json::to_value(&review).expect("serialization failed");
        assert_eq!(value["authorName"], "Verified Buyer");
        assert_eq!(value["originalLanguage"], "en");
        assert_eq!(value["rating"], 5);
    }
}
