use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match optional(var).as_deref().map(str::to_ascii_lowercase).as_deref() {
            None => Ok(default),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some("0" | "false" | "no" | "off") => Ok(false),
            Some(other) => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let log_level = or_default("KURATE_LOG_LEVEL", "info");
    let database_url = optional("DATABASE_URL");

    let db_max_connections = parse_u32("KURATE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("KURATE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("KURATE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_user_agent = or_default("KURATE_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_request_timeout_secs = parse_u64("KURATE_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_navigation_timeout_secs =
        parse_u64("KURATE_SCRAPER_NAVIGATION_TIMEOUT_SECS", "45")?;
    let scraper_selector_timeout_secs = parse_u64("KURATE_SCRAPER_SELECTOR_TIMEOUT_SECS", "10")?;
    let scraper_max_reviews = parse_usize("KURATE_SCRAPER_MAX_REVIEWS", "100")?;
    let scraper_review_page_size = parse_u32("KURATE_SCRAPER_REVIEW_PAGE_SIZE", "20")?;
    if scraper_review_page_size == 0 {
        return Err(invalid(
            "KURATE_SCRAPER_REVIEW_PAGE_SIZE",
            "page size must be at least 1".to_string(),
        ));
    }

    let browser_executable = optional("KURATE_BROWSER_EXECUTABLE").map(PathBuf::from);
    let browser_headless = parse_bool("KURATE_BROWSER_HEADLESS", true)?;
    let screenshot_dir = optional("KURATE_SCREENSHOT_DIR").map(PathBuf::from);

    let llm_api_key = optional("KURATE_LLM_API_KEY");
    let llm_base_url = or_default("KURATE_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("KURATE_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_u64("KURATE_LLM_TIMEOUT_SECS", "60")?;
    let brand_name = or_default("KURATE_BRAND_NAME", "Kurate");
    let translate_delay_ms = parse_u64("KURATE_TRANSLATE_DELAY_MS", "1000")?;
    let translate_batch_limit = parse_usize("KURATE_TRANSLATE_BATCH_LIMIT", "10")?;

    Ok(AppConfig {
        database_url,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_user_agent,
        scraper_request_timeout_secs,
        scraper_navigation_timeout_secs,
        scraper_selector_timeout_secs,
        scraper_max_reviews,
        scraper_review_page_size,
        browser_executable,
        browser_headless,
        screenshot_dir,
        llm_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        brand_name,
        translate_delay_ms,
        translate_batch_limit,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
