//! `scrape` and `reviews` command handlers.
//!
//! Per-URL failures land in the printed summary; only setup problems
//! (missing database, no adapter for a reviews URL) abort the command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use kurate_core::{AppConfig, ProductDraft, ReviewScrapeResult};
use kurate_db::PgDraftStore;
use kurate_scraper::aliexpress::url::{canonical_product_url, extract_product_id};
use kurate_scraper::{
    scrape_urls, AdapterRegistry, AliExpressAdapter, ChromiumLauncher, ExtractionSettings,
    FeedbackClient, FeedbackSettings, ScrapeBatchReport, SourceAdapter,
};
use serde::Serialize;

use crate::print_json;

/// Every adapter the CLI knows about, configured from `config`.
pub(crate) fn build_registry(config: &AppConfig) -> anyhow::Result<AdapterRegistry> {
    let launcher = ChromiumLauncher::new(
        config.browser_executable.clone(),
        config.browser_headless,
        &config.scraper_user_agent,
        config.scraper_request_timeout_secs,
    );
    let feedback = FeedbackClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        feedback_settings(config),
    )
    .context("failed to build review feed client")?;
    let adapter = AliExpressAdapter::new(
        Arc::new(launcher),
        feedback,
        extraction_settings(config),
    );
    Ok(AdapterRegistry::new(vec![Arc::new(adapter)]))
}

pub(crate) fn extraction_settings(config: &AppConfig) -> ExtractionSettings {
    ExtractionSettings {
        navigation_timeout: Duration::from_secs(config.scraper_navigation_timeout_secs),
        selector_timeout: Duration::from_secs(config.scraper_selector_timeout_secs),
        screenshot_dir: config.screenshot_dir.clone(),
        ..ExtractionSettings::default()
    }
}

pub(crate) fn feedback_settings(config: &AppConfig) -> FeedbackSettings {
    FeedbackSettings {
        page_size: config.scraper_review_page_size,
        max_reviews: config.scraper_max_reviews,
        ..FeedbackSettings::default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeSummary {
    #[serde(flatten)]
    report: ScrapeBatchReport,
    persisted: usize,
    drafts_created: usize,
    persist_errors: Vec<String>,
}

/// Scrapes `urls`, then stores each success unless `dry_run` is set.
///
/// # Errors
///
/// Returns an error if the registry cannot be built or, outside a dry run,
/// the database is unreachable. Per-URL failures are reported, not raised.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    urls: &[String],
    dry_run: bool,
    queue_drafts: bool,
) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    let pool = if dry_run {
        None
    } else {
        Some(kurate_db::connect_pool_from_config(config).await?)
    };

    let report = scrape_urls(&registry, urls).await;
    let mut summary = ScrapeSummary {
        report,
        persisted: 0,
        drafts_created: 0,
        persist_errors: Vec::new(),
    };

    if let Some(pool) = pool {
        let drafts = PgDraftStore::new(pool.clone());
        for scraped in &summary.report.results {
            let stored = kurate_db::insert_scraped_product(
                &pool,
                scraped.source,
                &scraped.url,
                &scraped.result,
            )
            .await;
            if let Err(e) = stored {
                tracing::error!(url = %scraped.url, error = %e, "failed to store scraped product");
                summary.persist_errors.push(format!("{}: {e}", scraped.url));
                continue;
            }
            summary.persisted += 1;

            if queue_drafts {
                let result = &scraped.result;
                let draft = ProductDraft::new_pending(
                    result.name.clone(),
                    result.description.clone().unwrap_or_default(),
                    result.price_text.clone().unwrap_or_default(),
                    scraped.source,
                );
                match drafts.insert_draft(&draft).await {
                    Ok(()) => summary.drafts_created += 1,
                    Err(e) => {
                        tracing::error!(url = %scraped.url, error = %e, "failed to queue draft");
                        summary.persist_errors.push(format!("{}: {e}", scraped.url));
                    }
                }
            }
        }
        pool.close().await;
    }

    print_json(&summary)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewSummary {
    url: String,
    source: &'static str,
    count: usize,
    stored: Option<usize>,
    reviews: Vec<ReviewScrapeResult>,
}

/// URLs a stored product may have been recorded under.
pub(crate) fn lookup_urls(url: &str) -> Vec<String> {
    let mut urls = vec![url.to_owned()];
    if let Ok(id) = extract_product_id(url) {
        let canonical = canonical_product_url(&id);
        if canonical != url {
            urls.push(canonical);
        }
    }
    urls
}

/// Collects reviews for `url` and, unless `dry_run` is set, attaches them
/// to the scraped product previously stored for it.
///
/// # Errors
///
/// Returns an error if no adapter handles `url`, the adapter has no review
/// support, or outside a dry run the product was never scraped.
pub(crate) async fn run_reviews(
    config: &AppConfig,
    url: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    let adapter = registry
        .resolve(url)
        .ok_or_else(|| anyhow::anyhow!("no adapter handles {url}"))?;
    if !adapter.supports_review_scraping() {
        anyhow::bail!("adapter '{}' cannot collect reviews", adapter.name());
    }

    // Resolve the stored product first so a missing scrape fails fast.
    let target = if dry_run {
        None
    } else {
        let pool = kurate_db::connect_pool_from_config(config).await?;
        let mut product = None;
        for candidate in lookup_urls(url) {
            product = kurate_db::find_scraped_product_by_url(&pool, &candidate).await?;
            if product.is_some() {
                break;
            }
        }
        let product = product.ok_or_else(|| {
            anyhow::anyhow!("no scraped product stored for {url}; run `kurate scrape` first")
        })?;
        Some((pool, product.id))
    };

    let reviews = adapter.extract_reviews("", url).await;
    tracing::info!(url, count = reviews.len(), "reviews collected");

    let stored = match target {
        None => None,
        Some((pool, product_id)) => {
            let inserted = kurate_db::insert_scraped_reviews(&pool, product_id, &reviews).await?;
            pool.close().await;
            Some(inserted)
        }
    };

    print_json(&ReviewSummary {
        url: url.to_owned(),
        source: adapter.name(),
        count: reviews.len(),
        stored,
        reviews,
    })
}
