//! Headless browser boundary.
//!
//! Adapters drive pages only through these traits, so extraction logic can
//! be exercised against a scripted fake. The real implementation lives in
//! [`chromium`] behind the `chromium` feature.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

#[cfg(feature = "chromium")]
pub mod chromium;

#[cfg(test)]
pub(crate) mod fake;

/// Starts isolated browser sessions. Each [`SourceAdapter::extract`] call
/// owns exactly one session.
///
/// [`SourceAdapter::extract`]: crate::SourceAdapter::extract
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// # Errors
    ///
    /// [`ScraperError::Browser`] when the browser process cannot start.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScraperError>;
}

/// One page in one browser process.
///
/// Settling helpers (`wait_for_selector`, `hover`, `scroll_to`) are
/// best-effort and report success instead of erroring.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates and waits for the load event, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// [`ScraperError::NavigationTimeout`] past the bound,
    /// [`ScraperError::Browser`] for protocol failures.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// `true` once `selector` matches, `false` if `timeout` elapses first.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool;

    async fn hover(&self, selector: &str) -> bool;

    /// Hovers up to `limit` elements matching `selector` in document order
    /// and returns how many were hovered.
    async fn hover_each(&self, selector: &str, limit: usize) -> usize;

    /// Scrolls to `fraction` of the document height (`0.0` is the top).
    async fn scroll_to(&self, fraction: f64);

    /// Evaluates a script expression and returns its JSON value.
    ///
    /// # Errors
    ///
    /// [`ScraperError::Browser`] when evaluation throws or the value is not
    /// serializable.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError>;

    /// # Errors
    ///
    /// [`ScraperError::Browser`] when capture or the file write fails.
    async fn screenshot(&self, path: &Path) -> Result<(), ScraperError>;

    /// Shuts the browser down. Must be safe to call on a session whose page
    /// is in any state.
    async fn close(&mut self);
}
