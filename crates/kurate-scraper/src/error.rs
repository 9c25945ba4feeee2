use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot resolve a product id from \"{url}\": {reason}")]
    InvalidProductUrl { url: String, reason: String },

    #[error("no source adapter handles \"{url}\"")]
    NoAdapter { url: String },

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl ScraperError {
    /// Returns `false` for errors where trying the same input again cannot
    /// succeed: there is no valid target to scrape.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ScraperError::InvalidProductUrl { .. } | ScraperError::NoAdapter { .. }
        )
    }
}
