//! Sequential multi-URL scraping.

use kurate_core::ScrapeResult;
use serde::Serialize;

use crate::adapter::AdapterRegistry;
use crate::error::ScraperError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedUrl {
    pub url: String,
    pub source: &'static str,
    pub result: ScrapeResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeFailure {
    pub url: String,
    pub error: String,
    pub retryable: bool,
}

/// Per-URL outcomes of one batch, each URL in exactly one list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeBatchReport {
    pub results: Vec<ScrapedUrl>,
    pub errors: Vec<ScrapeFailure>,
}

impl ScrapeBatchReport {
    fn record_failure(&mut self, url: &str, err: &ScraperError) {
        tracing::warn!(url, error = %err, retryable = err.is_retryable(), "scrape failed");
        self.errors.push(ScrapeFailure {
            url: url.to_owned(),
            error: err.to_string(),
            retryable: err.is_retryable(),
        });
    }
}

/// Scrapes each URL in order with whichever adapter claims it. A URL that
/// no adapter handles, or whose extraction fails, lands in `errors`; the
/// rest of the batch proceeds.
pub async fn scrape_urls(registry: &AdapterRegistry, urls: &[String]) -> ScrapeBatchReport {
    let mut report = ScrapeBatchReport::default();

    for url in urls {
        let Some(adapter) = registry.resolve(url) else {
            report.record_failure(url, &ScraperError::NoAdapter { url: url.clone() });
            continue;
        };

        match adapter.extract("", url).await {
            Ok(result) => {
                tracing::info!(url = %url, source = adapter.name(), name = %result.name, "scraped");
                report.results.push(ScrapedUrl {
                    url: url.clone(),
                    source: adapter.name(),
                    result,
                });
            }
            Err(e) => report.record_failure(url, &e),
        }
    }

    tracing::info!(
        succeeded = report.results.len(),
        failed = report.errors.len(),
        "scrape batch complete"
    );
    report
}
