//! Offline unit tests for kurate-db pool configuration and row types.
//! These tests do not require a live database connection.

use kurate_core::{AppConfig, DraftStatus, ProductDraft};
use kurate_db::{DraftRow, PoolConfig, ScrapedProductRow};

fn app_config(database_url: Option<&str>) -> AppConfig {
    AppConfig {
        database_url: database_url.map(str::to_string),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_user_agent: "ua".to_string(),
        scraper_request_timeout_secs: 30,
        scraper_navigation_timeout_secs: 45,
        scraper_selector_timeout_secs: 10,
        scraper_max_reviews: 100,
        scraper_review_page_size: 20,
        browser_executable: None,
        browser_headless: true,
        screenshot_dir: None,
        llm_api_key: None,
        llm_base_url: "https://api.openai.com/v1".to_string(),
        llm_model: "gpt-4o-mini".to_string(),
        llm_timeout_secs: 60,
        brand_name: "Kurate".to_string(),
        translate_delay_ms: 1000,
        translate_batch_limit: 10,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config(Some("postgres://example")));
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_without_url_is_missing_database_url() {
    let err = kurate_db::connect_pool_from_config(&app_config(None))
        .await
        .unwrap_err();
    assert!(matches!(err, kurate_db::DbError::MissingDatabaseUrl));
}

/// Compile-time smoke test: confirm that [`DraftRow`] has all expected
/// fields with the correct types and converts into a domain draft.
#[test]
fn draft_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let now = Utc::now();
    let row = DraftRow {
        id: Uuid::new_v4(),
        raw_name: "Nordic Ceramic Vase".to_string(),
        raw_description: String::new(),
        raw_price_text: "US $9.80".to_string(),
        raw_source_name: "aliexpress".to_string(),
        status: "translated".to_string(),
        ai_name: Some("Quiet Ceramic Vase".to_string()),
        ai_description: Some("Stoneware, 20cm.".to_string()),
        ai_short_description: Some("Matte vase".to_string()),
        ai_category: Some("home".to_string()),
        ai_suggested_price: Some(2900_i64),
        ai_model: Some("gpt-4o-mini".to_string()),
        translated_at: Some(now),
        translation_error: None,
        created_at: now,
        updated_at: now,
    };

    let draft = ProductDraft::try_from(row).unwrap();
    assert_eq!(draft.status, DraftStatus::Translated);
    assert_eq!(draft.ai_suggested_price, Some(2900));
    assert_eq!(draft.translated_at, Some(now));
}

/// Compile-time smoke test: confirm that [`ScrapedProductRow`] has all
/// expected fields with the correct types. No database required.
#[test]
fn scraped_product_row_has_expected_fields() {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    let row = ScrapedProductRow {
        id: Uuid::new_v4(),
        source: "aliexpress".to_string(),
        external_id: Some("1005006123456789".to_string()),
        source_url: "https://www.aliexpress.com/item/1005006123456789.html".to_string(),
        name: "Ceramic Vase".to_string(),
        description: None,
        price_text: Some("US $9.80".to_string()),
        images: json!(["https://ae01.alicdn.com/kf/a.jpg"]),
        category: Some("Vases".to_string()),
        metadata: None,
        scraped_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.source, "aliexpress");
    assert!(row.images.is_array());
    assert!(row.metadata.is_none());
}
