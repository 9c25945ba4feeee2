//! Product drafts and their translation lifecycle.
//!
//! ```text
//! pending_translation --MarkTranslating--> translating --Translated--> translated
//!                      ^                         |
//!                      +----TranslationFailed----+
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    PendingTranslation,
    Translating,
    Translated,
}

impl DraftStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DraftStatus::PendingTranslation => "pending_translation",
            DraftStatus::Translating => "translating",
            DraftStatus::Translated => "translated",
        }
    }
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_translation" => Ok(DraftStatus::PendingTranslation),
            "translating" => Ok(DraftStatus::Translating),
            "translated" => Ok(DraftStatus::Translated),
            other => Err(StoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// Storefront categories an AI rewrite may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Home,
    Kitchen,
    Beauty,
    Fashion,
    Jewelry,
    Electronics,
    Sports,
    Toys,
    Pets,
    Garden,
    Health,
    Office,
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 13] = [
        ProductCategory::Home,
        ProductCategory::Kitchen,
        ProductCategory::Beauty,
        ProductCategory::Fashion,
        ProductCategory::Jewelry,
        ProductCategory::Electronics,
        ProductCategory::Sports,
        ProductCategory::Toys,
        ProductCategory::Pets,
        ProductCategory::Garden,
        ProductCategory::Health,
        ProductCategory::Office,
        ProductCategory::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Home => "home",
            ProductCategory::Kitchen => "kitchen",
            ProductCategory::Beauty => "beauty",
            ProductCategory::Fashion => "fashion",
            ProductCategory::Jewelry => "jewelry",
            ProductCategory::Electronics => "electronics",
            ProductCategory::Sports => "sports",
            ProductCategory::Toys => "toys",
            ProductCategory::Pets => "pets",
            ProductCategory::Garden => "garden",
            ProductCategory::Health => "health",
            ProductCategory::Office => "office",
            ProductCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    /// Exact match on the lowercase wire name; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("\"{s}\" is not a known category"))
    }
}

/// Validated output of one LLM rewrite. Never persisted on its own; its
/// fields are copied into a draft's AI columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub category: ProductCategory,
    /// Always strictly positive.
    pub suggested_price_cents: i64,
}

/// A product candidate awaiting AI copywriting and human curation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub id: Uuid,
    pub raw_name: String,
    pub raw_description: String,
    pub raw_price_text: String,
    pub raw_source_name: String,
    pub status: DraftStatus,
    pub ai_name: Option<String>,
    pub ai_description: Option<String>,
    pub ai_short_description: Option<String>,
    pub ai_category: Option<String>,
    pub ai_suggested_price: Option<i64>,
    pub ai_model: Option<String>,
    pub translated_at: Option<DateTime<Utc>>,
    pub translation_error: Option<String>,
}

impl ProductDraft {
    /// A fresh draft as curation intake creates it.
    #[must_use]
    pub fn new_pending(
        raw_name: impl Into<String>,
        raw_description: impl Into<String>,
        raw_price_text: impl Into<String>,
        raw_source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_name: raw_name.into(),
            raw_description: raw_description.into(),
            raw_price_text: raw_price_text.into(),
            raw_source_name: raw_source_name.into(),
            status: DraftStatus::PendingTranslation,
            ai_name: None,
            ai_description: None,
            ai_short_description: None,
            ai_category: None,
            ai_suggested_price: None,
            ai_model: None,
            translated_at: None,
            translation_error: None,
        }
    }

    /// Applies `update` in place. Store implementations must produce the
    /// same field changes.
    pub fn apply(&mut self, update: &DraftUpdate) {
        match update {
            DraftUpdate::MarkTranslating => {
                self.status = DraftStatus::Translating;
            }
            DraftUpdate::Translated(ai) => {
                self.status = DraftStatus::Translated;
                self.ai_name = Some(ai.result.name.clone());
                self.ai_description = Some(ai.result.description.clone());
                self.ai_short_description = Some(ai.result.short_description.clone());
                self.ai_category = Some(ai.result.category.as_str().to_string());
                self.ai_suggested_price = Some(ai.result.suggested_price_cents);
                self.ai_model = Some(ai.model.clone());
                self.translated_at = Some(ai.translated_at);
                self.translation_error = None;
            }
            // A failed retranslation drops earlier output: AI fields exist
            // only while the draft is translated.
            DraftUpdate::TranslationFailed { error } => {
                self.status = DraftStatus::PendingTranslation;
                self.ai_name = None;
                self.ai_description = None;
                self.ai_short_description = None;
                self.ai_category = None;
                self.ai_suggested_price = None;
                self.ai_model = None;
                self.translated_at = None;
                self.translation_error = Some(error.clone());
            }
        }
    }
}

/// AI-generated fields written on a successful translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiFields {
    pub result: TranslationResult,
    pub model: String,
    pub translated_at: DateTime<Utc>,
}

/// The only mutations the translation workflow performs on a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftUpdate {
    MarkTranslating,
    Translated(AiFields),
    /// Reverts to `pending_translation` so the next batch picks it up again.
    TranslationFailed { error: String },
}
