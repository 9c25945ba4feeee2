//! Marketplace adapters and first-match dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use kurate_core::{ReviewScrapeResult, ScrapeResult};

use crate::error::ScraperError;

/// Extraction logic for one marketplace.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier, also stored as the scraped product's source.
    fn name(&self) -> &'static str;

    /// Pure URL test; never touches the network.
    fn can_handle(&self, url: &str) -> bool;

    /// Extracts one product. Adapters that drive their own browser may
    /// ignore `html`.
    ///
    /// # Errors
    ///
    /// Only for failures that leave nothing usable, e.g. an unresolvable
    /// product URL or a page that never loaded.
    async fn extract(&self, html: &str, url: &str) -> Result<ScrapeResult, ScraperError>;

    fn supports_review_scraping(&self) -> bool {
        false
    }

    /// Collected reviews; empty when unsupported or nothing could be read.
    async fn extract_reviews(&self, _html: &str, _url: &str) -> Vec<ReviewScrapeResult> {
        Vec::new()
    }
}

/// Ordered adapter list. Earlier adapters win when several match.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// The first adapter whose `can_handle` accepts `url`.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|adapter| adapter.can_handle(url))
    }

    /// Adapter names in resolution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|adapter| adapter.name()).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Accepts URLs containing `needle`; extraction echoes the URL.
    pub(crate) struct StubAdapter {
        pub name: &'static str,
        pub needle: &'static str,
    }

    #[async_trait]
    impl SourceAdapter for StubAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_handle(&self, url: &str) -> bool {
            url.contains(self.needle)
        }

        async fn extract(&self, _html: &str, url: &str) -> Result<ScrapeResult, ScraperError> {
            Ok(ScrapeResult {
                name: format!("{} product", self.name),
                description: None,
                price_text: None,
                images: Vec::new(),
                category: None,
                external_id: Some(url.to_owned()),
                metadata: None,
            })
        }
    }

    fn registry() -> AdapterRegistry {
        AdapterRegistry::new(vec![
            Arc::new(StubAdapter {
                name: "specific",
                needle: "shop.example/item",
            }),
            Arc::new(StubAdapter {
                name: "generic",
                needle: "shop.example",
            }),
        ])
    }

    #[test]
    fn resolve_returns_first_match() {
        let registry = registry();
        let adapter = registry.resolve("https://shop.example/item/1").unwrap();
        assert_eq!(adapter.name(), "specific");

        let adapter = registry.resolve("https://shop.example/about").unwrap();
        assert_eq!(adapter.name(), "generic");
    }

    #[test]
    fn resolve_returns_none_without_match() {
        assert!(registry().resolve("https://elsewhere.example/").is_none());
    }

    #[test]
    fn default_registry_resolves_nothing() {
        let registry = AdapterRegistry::default();
        assert!(registry.names().is_empty());
        assert!(registry.resolve("https://shop.example/item/1").is_none());
    }

    #[test]
    fn names_are_in_resolution_order() {
        assert_eq!(registry().names(), vec!["specific", "generic"]);
    }

    #[tokio::test]
    async fn review_scraping_defaults_to_unsupported() {
        let adapter = StubAdapter {
            name: "stub",
            needle: "x",
        };
        assert!(!adapter.supports_review_scraping());
        assert!(adapter.extract_reviews("", "x").await.is_empty());
    }
}
