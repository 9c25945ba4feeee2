//! Review collection from the public feedback JSON feed. No browser.

use std::time::Duration;

use kurate_core::ReviewScrapeResult;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::images::clean_image_url;
use super::url::canonical_product_url;
use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

const DEFAULT_FEEDBACK_URL: &str = "https://feedback.aliexpress.com/pc/searchEvaluation.do";

/// Hard stop on paging regardless of how the feed behaves.
const MAX_PAGES: u32 = 50;

/// Neutral label replacing marketplace-attribution author names.
pub const NEUTRAL_AUTHOR: &str = "Verified Buyer";

#[derive(Debug, Clone)]
pub struct FeedbackSettings {
    pub page_size: u32,
    /// Collection stops once this many reviews are accumulated.
    pub max_reviews: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_reviews: 100,
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedbackResponse {
    #[serde(default)]
    data: Option<FeedbackData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackData {
    #[serde(default)]
    eva_view_list: Option<Vec<FeedbackItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackItem {
    #[serde(default)]
    buyer_feedback: Option<String>,
    /// 0–100 scale.
    #[serde(default)]
    buyer_eval: Option<i64>,
    #[serde(default)]
    buyer_name: Option<String>,
    #[serde(default)]
    buyer_country: Option<String>,
    #[serde(default)]
    eval_date: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
}

/// Pages through the feedback feed for one product.
pub struct FeedbackClient {
    client: Client,
    base_url: Url,
    settings: FeedbackSettings,
}

impl FeedbackClient {
    /// # Errors
    ///
    /// [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        settings: FeedbackSettings,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(DEFAULT_FEEDBACK_URL, timeout_secs, user_agent, settings)
    }

    /// Points the client at another feed endpoint (tests, mirrors).
    ///
    /// # Errors
    ///
    /// [`ScraperError::Http`] if the HTTP client cannot be built,
    /// [`ScraperError::Extraction`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        settings: FeedbackSettings,
    ) -> Result<Self, ScraperError> {
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::Extraction {
            url: base_url.to_owned(),
            reason: format!("invalid feedback endpoint: {e}"),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    /// Collects reviews page by page until a page comes back empty, a page
    /// fails, or the cap is reached. Never errors: a failed page ends
    /// collection and whatever was gathered so far is returned.
    pub async fn fetch_reviews(&self, product_id: &str) -> Vec<ReviewScrapeResult> {
        let cap = self.settings.max_reviews;
        let mut reviews = Vec::new();

        for page in 1..=MAX_PAGES {
            if reviews.len() >= cap {
                break;
            }

            let items = match self.fetch_page(product_id, page).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        product_id,
                        page,
                        collected = reviews.len(),
                        error = %e,
                        "review page failed; returning partial results"
                    );
                    break;
                }
            };

            if items.is_empty() {
                tracing::debug!(product_id, page, "empty review page; done");
                break;
            }

            let remaining = cap - reviews.len();
            reviews.extend(items.into_iter().filter_map(map_review).take(remaining));
        }

        tracing::info!(product_id, count = reviews.len(), "reviews collected");
        reviews
    }

    async fn fetch_page(
        &self,
        product_id: &str,
        page: u32,
    ) -> Result<Vec<FeedbackItem>, ScraperError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("productId", product_id)
            .append_pair("lang", "en_US")
            .append_pair("country", "US")
            .append_pair("page", &page.to_string())
            .append_pair("pageSize", &self.settings.page_size.to_string())
            .append_pair("filter", "all")
            .append_pair("sort", "complex_default");
        let referer = canonical_product_url(product_id);

        retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || {
                let url = url.clone();
                let referer = referer.clone();
                async move {
                    let response = self
                        .client
                        .get(url.clone())
                        .header(reqwest::header::ACCEPT, "application/json")
                        .header(reqwest::header::REFERER, referer)
                        .send()
                        .await?;
                    let status = response.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after_secs = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(60);
                        return Err(ScraperError::RateLimited {
                            domain: url.host_str().unwrap_or_default().to_owned(),
                            retry_after_secs,
                        });
                    }

                    if !status.is_success() {
                        return Err(ScraperError::UnexpectedStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let body = response.text().await?;
                    let parsed: FeedbackResponse =
                        serde_json::from_str(&body).map_err(|source| {
                            ScraperError::Deserialize {
                                context: format!("feedback page {page} for product {product_id}"),
                                source,
                            }
                        })?;
                    Ok(parsed
                        .data
                        .and_then(|d| d.eva_view_list)
                        .unwrap_or_default())
                }
            },
        )
        .await
    }
}

/// Drops items without text or rating.
fn map_review(item: FeedbackItem) -> Option<ReviewScrapeResult> {
    let text = item.buyer_feedback.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        return None;
    }
    let rating = rating_from_score(item.buyer_eval?);

    Some(ReviewScrapeResult {
        text: text.to_owned(),
        rating,
        author_name: sanitize_author_name(item.buyer_name.as_deref()),
        author_country: item
            .buyer_country
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty()),
        review_date: item
            .eval_date
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()),
        images: item
            .images
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| clean_image_url(raw))
            .collect(),
        original_language: Some(detect_language(text).to_owned()),
    })
}

/// Maps the feed's 0–100 score to 1–5 stars: `score / 20`, clamped.
#[must_use]
pub fn rating_from_score(score: i64) -> u8 {
    u8::try_from((score / 20).clamp(1, 5)).unwrap_or(1)
}

/// Replaces marketplace-attribution names so no origin trace survives.
/// Blank names become `None`.
#[must_use]
pub fn sanitize_author_name(name: Option<&str>) -> Option<String> {
    let name = name.map(str::trim).filter(|n| !n.is_empty())?;
    let lower = name.to_lowercase();
    if lower == "shopper" || lower.contains("aliexpress") {
        Some(NEUTRAL_AUTHOR.to_owned())
    } else {
        Some(name.to_owned())
    }
}

/// ISO 639-1 guess from Unicode blocks. Kana is checked before Han since
/// Japanese text mixes both.
#[must_use]
pub fn detect_language(text: &str) -> &'static str {
    let has = |ranges: &[(u32, u32)]| {
        text.chars().any(|c| {
            let cp = u32::from(c);
            ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
        })
    };

    if has(&[(0x3040, 0x309F), (0x30A0, 0x30FF)]) {
        "ja"
    } else if has(&[(0xAC00, 0xD7AF), (0x1100, 0x11FF), (0x3130, 0x318F)]) {
        "ko"
    } else if has(&[(0x4E00, 0x9FFF), (0x3400, 0x4DBF)]) {
        "zh"
    } else if has(&[(0x0400, 0x04FF)]) {
        "ru"
    } else if has(&[(0x0600, 0x06FF)]) {
        "ar"
    } else {
        "en"
    }
}
