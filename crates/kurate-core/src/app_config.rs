use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    /// Only required by commands that touch the draft store.
    pub database_url: Option<String>,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_request_timeout_secs: u64,
    /// Upper bound on a single product page navigation.
    pub scraper_navigation_timeout_secs: u64,
    /// Upper bound on waiting for a lazily rendered selector.
    pub scraper_selector_timeout_secs: u64,
    pub scraper_max_reviews: usize,
    pub scraper_review_page_size: u32,
    pub browser_executable: Option<PathBuf>,
    pub browser_headless: bool,
    /// When set, a full-page screenshot is written here on extraction failure.
    pub screenshot_dir: Option<PathBuf>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub brand_name: String,
    pub translate_delay_ms: u64,
    pub translate_batch_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field(
                "scraper_navigation_timeout_secs",
                &self.scraper_navigation_timeout_secs,
            )
            .field(
                "scraper_selector_timeout_secs",
                &self.scraper_selector_timeout_secs,
            )
            .field("scraper_max_reviews", &self.scraper_max_reviews)
            .field("scraper_review_page_size", &self.scraper_review_page_size)
            .field("browser_executable", &self.browser_executable)
            .field("browser_headless", &self.browser_headless)
            .field("screenshot_dir", &self.screenshot_dir)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("brand_name", &self.brand_name)
            .field("translate_delay_ms", &self.translate_delay_ms)
            .field("translate_batch_limit", &self.translate_batch_limit)
            .finish()
    }
}
