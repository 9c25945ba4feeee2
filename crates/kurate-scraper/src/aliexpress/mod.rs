//! AliExpress product pages and review feed.

mod extract;
pub mod images;
pub mod reviews;
pub mod snapshot;
pub mod url;

use std::sync::Arc;

use async_trait::async_trait;
use kurate_core::{ReviewScrapeResult, ScrapeResult};

pub use extract::ExtractionSettings;
pub use reviews::{FeedbackClient, FeedbackSettings};

use crate::adapter::SourceAdapter;
use crate::browser::BrowserLauncher;
use crate::error::ScraperError;

pub const ADAPTER_NAME: &str = "aliexpress";

/// Renders product pages in a headless browser; reads reviews over plain
/// HTTP. Holds no per-product state, so one instance serves a whole batch.
pub struct AliExpressAdapter {
    launcher: Arc<dyn BrowserLauncher>,
    feedback: FeedbackClient,
    settings: ExtractionSettings,
}

impl AliExpressAdapter {
    #[must_use]
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        feedback: FeedbackClient,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            launcher,
            feedback,
            settings,
        }
    }
}

#[async_trait]
impl SourceAdapter for AliExpressAdapter {
    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn can_handle(&self, url: &str) -> bool {
        url::is_aliexpress_url(url)
    }

    /// `html` is ignored; the page is always rendered fresh.
    async fn extract(&self, _html: &str, url: &str) -> Result<ScrapeResult, ScraperError> {
        extract::extract_product(self.launcher.as_ref(), &self.settings, url).await
    }

    fn supports_review_scraping(&self) -> bool {
        true
    }

    async fn extract_reviews(&self, _html: &str, url: &str) -> Vec<ReviewScrapeResult> {
        match url::extract_product_id(url) {
            Ok(product_id) => self.feedback.fetch_reviews(&product_id).await,
            Err(e) => {
                tracing::warn!(url, error = %e, "cannot collect reviews");
                Vec::new()
            }
        }
    }
}
