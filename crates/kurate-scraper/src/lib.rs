pub mod adapter;
pub mod aliexpress;
pub mod batch;
pub mod browser;
pub mod error;
pub(crate) mod rate_limit;

pub use adapter::{AdapterRegistry, SourceAdapter};
pub use aliexpress::{AliExpressAdapter, ExtractionSettings, FeedbackClient, FeedbackSettings};
pub use batch::{scrape_urls, ScrapeBatchReport, ScrapeFailure, ScrapedUrl};
pub use browser::{BrowserLauncher, BrowserSession};
#[cfg(feature = "chromium")]
pub use browser::chromium::ChromiumLauncher;
pub use error::ScraperError;
