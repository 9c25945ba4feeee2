//! Browser-driven product extraction.

use std::path::PathBuf;
use std::time::Duration;

use kurate_core::ScrapeResult;

use super::snapshot::{
    build_scrape_result, PageSnapshot, SnapshotOrigin, GALLERY_SELECTOR, PAGE_SNAPSHOT_SCRIPT,
    THUMBNAIL_SELECTOR,
};
use super::url::{canonical_product_url, extract_product_id};
use crate::browser::{BrowserLauncher, BrowserSession};
use crate::error::ScraperError;

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub navigation_timeout: Duration,
    /// Bound on waiting for the gallery; running out is not an error.
    pub selector_timeout: Duration,
    /// Pause at mid-page so lazy images start loading.
    pub settle_pause: Duration,
    pub thumbnail_hover_limit: usize,
    /// When set, a full-page screenshot is saved here on failure.
    pub screenshot_dir: Option<PathBuf>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(45),
            selector_timeout: Duration::from_secs(10),
            settle_pause: Duration::from_millis(800),
            thumbnail_hover_limit: 8,
            screenshot_dir: None,
        }
    }
}

/// Resolves the product id, scrapes the canonical page in a fresh session
/// and closes the session whatever the outcome.
///
/// # Errors
///
/// - [`ScraperError::InvalidProductUrl`] before any browser is launched.
/// - [`ScraperError::NavigationTimeout`], [`ScraperError::Browser`],
///   [`ScraperError::Deserialize`] or [`ScraperError::Extraction`] from the
///   page itself.
pub(crate) async fn extract_product(
    launcher: &dyn BrowserLauncher,
    settings: &ExtractionSettings,
    url: &str,
) -> Result<ScrapeResult, ScraperError> {
    let product_id = extract_product_id(url)?;
    let canonical_url = canonical_product_url(&product_id);
    let origin = SnapshotOrigin {
        product_id: &product_id,
        canonical_url: &canonical_url,
        source_url: url,
    };

    let mut session = launcher.launch().await?;
    let outcome = scrape_page(session.as_ref(), settings, origin).await;

    if let Err(e) = &outcome {
        tracing::warn!(url, canonical_url = %canonical_url, error = %e, "product extraction failed");
        if let Some(dir) = &settings.screenshot_dir {
            capture_failure_screenshot(session.as_ref(), dir, &product_id).await;
        }
    }

    session.close().await;
    outcome
}

async fn scrape_page(
    session: &dyn BrowserSession,
    settings: &ExtractionSettings,
    origin: SnapshotOrigin<'_>,
) -> Result<ScrapeResult, ScraperError> {
    session
        .goto(origin.canonical_url, settings.navigation_timeout)
        .await?;
    settle(session, settings).await;

    let raw = session.evaluate(PAGE_SNAPSHOT_SCRIPT).await?;
    let snapshot: PageSnapshot =
        serde_json::from_value(raw).map_err(|source| ScraperError::Deserialize {
            context: format!("page snapshot for {}", origin.canonical_url),
            source,
        })?;

    let result = build_scrape_result(&snapshot, origin)?;
    tracing::debug!(
        product_id = origin.product_id,
        images = result.images.len(),
        has_description = result.description.is_some(),
        has_price = result.price_text.is_some(),
        "product extracted"
    );
    Ok(result)
}

/// Coaxes lazy-loaded media into the DOM. Every step is best-effort.
async fn settle(session: &dyn BrowserSession, settings: &ExtractionSettings) {
    if !session
        .wait_for_selector(GALLERY_SELECTOR, settings.selector_timeout)
        .await
    {
        tracing::debug!("gallery did not render within selector timeout; continuing");
    }
    session.hover(GALLERY_SELECTOR).await;

    session.scroll_to(0.5).await;
    tokio::time::sleep(settings.settle_pause).await;
    session.scroll_to(0.0).await;

    let hovered = session
        .hover_each(THUMBNAIL_SELECTOR, settings.thumbnail_hover_limit)
        .await;
    tracing::debug!(hovered, "thumbnails hovered");
}

async fn capture_failure_screenshot(
    session: &dyn BrowserSession,
    dir: &std::path::Path,
    product_id: &str,
) {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let path = dir.join(format!("aliexpress-{product_id}-{stamp}.png"));
    match session.screenshot(&path).await {
        Ok(()) => tracing::info!(path = %path.display(), "saved failure screenshot"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failure screenshot not saved"),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
