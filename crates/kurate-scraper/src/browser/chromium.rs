//! Chromium over the DevTools protocol.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{BrowserLauncher, BrowserSession};
use crate::error::ScraperError;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);
const HOVER_PAUSE: Duration = Duration::from_millis(150);

fn browser_err(err: impl std::fmt::Display) -> ScraperError {
    ScraperError::Browser(err.to_string())
}

/// Launches one Chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    headless: bool,
    user_agent: String,
    request_timeout: Duration,
}

impl ChromiumLauncher {
    /// `executable` of `None` lets chromiumoxide locate an installed
    /// Chrome/Chromium.
    #[must_use]
    pub fn new(
        executable: Option<PathBuf>,
        headless: bool,
        user_agent: &str,
        request_timeout_secs: u64,
    ) -> Self {
        Self {
            executable,
            headless,
            user_agent: user_agent.to_owned(),
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.request_timeout)
            .window_size(1366, 900)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", self.user_agent));
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Browser)?;

        let (mut browser, mut handler) = Browser::launch(config).await.map_err(browser_err)?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler stopped");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(browser_err(e));
            }
        };

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page,
            handler_task: Some(handler_task),
        }))
    }
}

struct ChromiumSession {
    browser: Option<Browser>,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(browser_err(e)),
            Err(_) => Err(ScraperError::NavigationTimeout {
                url: url.to_owned(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn hover(&self, selector: &str) -> bool {
        match self.page.find_element(selector).await {
            Ok(element) => element.hover().await.is_ok(),
            Err(_) => false,
        }
    }

    async fn hover_each(&self, selector: &str, limit: usize) -> usize {
        let Ok(elements) = self.page.find_elements(selector).await else {
            return 0;
        };
        let mut hovered = 0;
        for element in elements.iter().take(limit) {
            if element.hover().await.is_ok() {
                hovered += 1;
                tokio::time::sleep(HOVER_PAUSE).await;
            }
        }
        hovered
    }

    async fn scroll_to(&self, fraction: f64) {
        let script = format!(
            "window.scrollTo(0, Math.floor(document.body.scrollHeight * {fraction}))"
        );
        if let Err(e) = self.page.evaluate_expression(script).await {
            tracing::debug!(error = %e, "scroll failed");
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(ScraperError::Browser)?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(browser_err)?;
        result.into_value().map_err(browser_err)
    }

    async fn screenshot(&self, path: &Path) -> Result<(), ScraperError> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page
            .save_screenshot(params, path)
            .await
            .map(|_| ())
            .map_err(browser_err)
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "failed to close browser cleanly");
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!(error = %e, "failed to reap browser process");
            }
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}
