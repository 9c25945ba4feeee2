use kurate_core::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM returned HTTP {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("LLM rate limited (HTTP 429, retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("LLM request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("LLM returned invalid JSON ({source}): {snippet}")]
    InvalidJson {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("LLM output failed validation on `{field}`: {reason}; raw: {snippet}")]
    Validation {
        field: &'static str,
        reason: String,
        snippet: String,
    },

    #[error("draft {id} not found")]
    DraftNotFound { id: Uuid },

    #[error("draft store error: {0}")]
    Store(#[from] StoreError),
}

impl CurationError {
    /// Whether this failure means the LLM provider is throttling us.
    ///
    /// Parse and validation errors never count: their messages quote model
    /// output, which may contain anything.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        match self {
            CurationError::RateLimited { .. } => true,
            CurationError::LlmStatus { status, body } => {
                *status == 429 || message_indicates_rate_limit(body)
            }
            CurationError::Http(e) => {
                e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS)
                    || message_indicates_rate_limit(&e.to_string())
            }
            CurationError::Store(e) => message_indicates_rate_limit(&e.to_string()),
            _ => false,
        }
    }
}

/// Case-insensitive match on the usual throttling phrases.
#[must_use]
pub fn message_indicates_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["429", "rate limit", "rate_limit", "too many requests"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_variant_is_rate_limit() {
        assert!(CurationError::RateLimited {
            retry_after_secs: None
        }
        .is_rate_limit());
    }

    #[test]
    fn status_429_is_rate_limit() {
        let err = CurationError::LlmStatus {
            status: 429,
            body: String::new(),
        };
        assert!(err.is_rate_limit());
    }

    #[test]
    fn provider_quota_message_is_rate_limit() {
        let err = CurationError::LlmStatus {
            status: 400,
            body: r#"{"error":{"code":"rate_limit_exceeded"}}"#.to_string(),
        };
        assert!(err.is_rate_limit());
    }

    #[test]
    fn server_error_is_not_rate_limit() {
        let err = CurationError::LlmStatus {
            status: 503,
            body: "upstream unavailable".to_string(),
        };
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn validation_quoting_429_is_not_rate_limit() {
        let err = CurationError::Validation {
            field: "suggestedPriceCents",
            reason: "must be a positive integer".to_string(),
            snippet: r#"{"suggestedPriceCents": -429}"#.to_string(),
        };
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn message_match_is_case_insensitive() {
        assert!(message_indicates_rate_limit("Too Many Requests"));
        assert!(message_indicates_rate_limit("Rate Limit reached for gpt-4o"));
        assert!(message_indicates_rate_limit("status 429"));
        assert!(message_indicates_rate_limit("code: RATE_LIMIT"));
        assert!(!message_indicates_rate_limit("connection reset by peer"));
    }
}
