//! Scripted in-process browser for tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BrowserLauncher, BrowserSession};
use crate::error::ScraperError;

/// What a fake session does when navigated.
#[derive(Debug, Clone)]
pub(crate) enum FakePage {
    /// Navigation succeeds and evaluation returns this snapshot.
    Loaded(serde_json::Value),
    /// Navigation exceeds its bound.
    NavigationTimeout,
    /// Navigation succeeds, evaluation throws.
    ScriptError(String),
}

/// Shared record of what every session was asked to do.
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub launches: usize,
    pub closes: usize,
    pub visited: Vec<String>,
    pub hovered_thumbnails: usize,
    pub scrolls: Vec<f64>,
    pub screenshots: Vec<PathBuf>,
}

/// Hands out one session per queued page, in order. An empty queue makes
/// `launch` fail.
#[derive(Clone, Default)]
pub(crate) struct FakeLauncher {
    pages: Arc<Mutex<VecDeque<FakePage>>>,
    pub log: Arc<Mutex<FakeLog>>,
}

impl FakeLauncher {
    pub(crate) fn with_pages(pages: impl IntoIterator<Item = FakePage>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into_iter().collect())),
            log: Arc::default(),
        }
    }

    pub(crate) fn log(&self) -> std::sync::MutexGuard<'_, FakeLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScraperError> {
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScraperError::Browser("no browser available".to_owned()))?;
        self.log.lock().unwrap().launches += 1;
        Ok(Box::new(FakeSession {
            page,
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeSession {
    page: FakePage,
    log: Arc<Mutex<FakeLog>>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScraperError> {
        self.log.lock().unwrap().visited.push(url.to_owned());
        match self.page {
            FakePage::NavigationTimeout => Err(ScraperError::NavigationTimeout {
                url: url.to_owned(),
                timeout_secs: timeout.as_secs(),
            }),
            _ => Ok(()),
        }
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> bool {
        true
    }

    async fn hover(&self, _selector: &str) -> bool {
        true
    }

    async fn hover_each(&self, _selector: &str, limit: usize) -> usize {
        let hovered = limit.min(3);
        self.log.lock().unwrap().hovered_thumbnails += hovered;
        hovered
    }

    async fn scroll_to(&self, fraction: f64) {
        self.log.lock().unwrap().scrolls.push(fraction);
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value, ScraperError> {
        match &self.page {
            FakePage::Loaded(value) => Ok(value.clone()),
            FakePage::ScriptError(message) => Err(ScraperError::Browser(message.clone())),
            FakePage::NavigationTimeout => Err(ScraperError::Browser(
                "evaluate called after failed navigation".to_owned(),
            )),
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<(), ScraperError> {
        self.log.lock().unwrap().screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}
