//! Listing rewrite: one LLM call, then strict validation of its output.

use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use kurate_core::{ProductCategory, TranslationResult};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::CurationError;
use crate::llm::LlmClient;
use crate::prompt::{build_prompt, RawProduct};

/// Raw LLM text quoted in errors is cut to this many characters.
const SNIPPET_CHARS: usize = 200;

/// A whole response wrapped in a Markdown fence, optional language tag.
static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```$").expect("valid regex")
});

pub struct TranslationService {
    llm: Arc<dyn LlmClient>,
    brand_name: String,
}

impl TranslationService {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>, brand_name: &str) -> Self {
        Self {
            llm,
            brand_name: brand_name.to_owned(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Rewrites raw supplier copy into a validated listing. Exactly one LLM
    /// call, no retry.
    ///
    /// # Errors
    ///
    /// Whatever the LLM client reports, [`CurationError::InvalidJson`] when
    /// the response does not parse, [`CurationError::Validation`] when any
    /// field is missing or out of range. Never returns partial data.
    pub async fn translate_product(
        &self,
        product: RawProduct<'_>,
    ) -> Result<TranslationResult, CurationError> {
        let prompt = build_prompt(&self.brand_name, product);
        let raw = self.llm.complete(&prompt).await?;
        parse_translation(&raw)
    }
}

/// Removes a Markdown code fence wrapped around the whole response.
/// Unwrapped text comes back trimmed.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(caps) = FENCED_RE.captures(trimmed) {
        return caps.get(1).map_or("", |m| m.as_str().trim());
    }
    // Opening fence with no closing one: drop the fence line.
    match trimmed.strip_prefix("```") {
        Some(rest) => rest.split_once('\n').map_or("", |(_, body)| body).trim(),
        None => trimmed,
    }
}

/// Parses and validates raw LLM output.
///
/// # Errors
///
/// [`CurationError::InvalidJson`] or [`CurationError::Validation`], each
/// carrying a snippet of `raw`.
pub fn parse_translation(raw: &str) -> Result<TranslationResult, CurationError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|source| CurationError::InvalidJson {
        snippet: snippet(raw),
        source,
    })?;

    let Value::Object(fields) = value else {
        return Err(invalid(raw, "$", "expected a JSON object"));
    };

    let name = required_text(&fields, "name", raw)?;
    let description = required_text(&fields, "description", raw)?;
    let short_description = required_text(&fields, "shortDescription", raw)?;

    let category = match fields.get("category") {
        Some(Value::String(s)) => ProductCategory::from_str(s.trim())
            .map_err(|reason| invalid(raw, "category", &reason))?,
        _ => return Err(invalid(raw, "category", "must be a string")),
    };

    let suggested_price_cents = match fields.get("suggestedPriceCents").and_then(Value::as_i64) {
        Some(cents) if cents > 0 => cents,
        _ => {
            return Err(invalid(
                raw,
                "suggestedPriceCents",
                "must be a positive integer",
            ))
        }
    };

    Ok(TranslationResult {
        name,
        description,
        short_description,
        category,
        suggested_price_cents,
    })
}

fn required_text(
    fields: &Map<String, Value>,
    field: &'static str,
    raw: &str,
) -> Result<String, CurationError> {
    match fields.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        Some(Value::String(_)) => Err(invalid(raw, field, "must not be empty")),
        _ => Err(invalid(raw, field, "must be a string")),
    }
}

fn invalid(raw: &str, field: &'static str, reason: &str) -> CurationError {
    CurationError::Validation {
        field,
        reason: reason.to_owned(),
        snippet: snippet(raw),
    }
}

fn snippet(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= SNIPPET_CHARS {
        trimmed.to_owned()
    } else {
        let mut cut: String = trimmed.chars().take(SNIPPET_CHARS - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
#[path = "translate_test.rs"]
mod tests;
