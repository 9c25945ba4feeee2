//! Postgres-backed [`DraftStore`] over the `product_drafts` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kurate_core::{DraftStatus, DraftStore, DraftUpdate, ProductDraft, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const DRAFT_COLUMNS: &str = "id, raw_name, raw_description, raw_price_text, raw_source_name, \
     status, ai_name, ai_description, ai_short_description, ai_category, ai_suggested_price, \
     ai_model, translated_at, translation_error, created_at, updated_at";

/// A row from the `product_drafts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DraftRow {
    pub id: Uuid,
    pub raw_name: String,
    pub raw_description: String,
    pub raw_price_text: String,
    pub raw_source_name: String,
    /// One of `pending_translation`, `translating`, `translated` (CHECK constraint).
    pub status: String,
    pub ai_name: Option<String>,
    pub ai_description: Option<String>,
    pub ai_short_description: Option<String>,
    pub ai_category: Option<String>,
    /// Cents.
    pub ai_suggested_price: Option<i64>,
    pub ai_model: Option<String>,
    pub translated_at: Option<DateTime<Utc>>,
    pub translation_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DraftRow> for ProductDraft {
    type Error = StoreError;

    fn try_from(row: DraftRow) -> Result<Self, Self::Error> {
        Ok(ProductDraft {
            id: row.id,
            raw_name: row.raw_name,
            raw_description: row.raw_description,
            raw_price_text: row.raw_price_text,
            raw_source_name: row.raw_source_name,
            status: row.status.parse::<DraftStatus>()?,
            ai_name: row.ai_name,
            ai_description: row.ai_description,
            ai_short_description: row.ai_short_description,
            ai_category: row.ai_category,
            ai_suggested_price: row.ai_suggested_price,
            ai_model: row.ai_model,
            translated_at: row.translated_at,
            translation_error: row.translation_error,
        })
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(err))
}

#[derive(Debug, Clone)]
pub struct PgDraftStore {
    pool: PgPool,
}

impl PgDraftStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new draft row exactly as given, id included.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the insert fails (e.g. duplicate id).
    pub async fn insert_draft(&self, draft: &ProductDraft) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO product_drafts \
                 (id, raw_name, raw_description, raw_price_text, raw_source_name, status, \
                  ai_name, ai_description, ai_short_description, ai_category, \
                  ai_suggested_price, ai_model, translated_at, translation_error) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(draft.id)
        .bind(&draft.raw_name)
        .bind(&draft.raw_description)
        .bind(&draft.raw_price_text)
        .bind(&draft.raw_source_name)
        .bind(draft.status.as_str())
        .bind(&draft.ai_name)
        .bind(&draft.ai_description)
        .bind(&draft.ai_short_description)
        .bind(&draft.ai_category)
        .bind(draft.ai_suggested_price)
        .bind(&draft.ai_model)
        .bind(draft.translated_at)
        .bind(&draft.translation_error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_update(
        &self,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<Option<DraftRow>, sqlx::Error> {
        match update {
            DraftUpdate::MarkTranslating => {
                sqlx::query_as::<_, DraftRow>(&format!(
                    "UPDATE product_drafts SET status = 'translating', updated_at = NOW() \
                     WHERE id = $1 RETURNING {DRAFT_COLUMNS}"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
            DraftUpdate::Translated(ai) => {
                sqlx::query_as::<_, DraftRow>(&format!(
                    "UPDATE product_drafts SET \
                         status               = 'translated', \
                         ai_name              = $2, \
                         ai_description       = $3, \
                         ai_short_description = $4, \
                         ai_category          = $5, \
                         ai_suggested_price   = $6, \
                         ai_model             = $7, \
                         translated_at        = $8, \
                         translation_error    = NULL, \
                         updated_at           = NOW() \
                     WHERE id = $1 RETURNING {DRAFT_COLUMNS}"
                ))
                .bind(id)
                .bind(&ai.result.name)
                .bind(&ai.result.description)
                .bind(&ai.result.short_description)
                .bind(ai.result.category.as_str())
                .bind(ai.result.suggested_price_cents)
                .bind(&ai.model)
                .bind(ai.translated_at)
                .fetch_optional(&self.pool)
                .await
            }
            DraftUpdate::TranslationFailed { error } => {
                sqlx::query_as::<_, DraftRow>(&format!(
                    "UPDATE product_drafts SET \
                         status               = 'pending_translation', \
                         ai_name              = NULL, \
                         ai_description       = NULL, \
                         ai_short_description = NULL, \
                         ai_category          = NULL, \
                         ai_suggested_price   = NULL, \
                         ai_model             = NULL, \
                         translated_at        = NULL, \
                         translation_error    = $2, \
                         updated_at           = NOW() \
                     WHERE id = $1 RETURNING {DRAFT_COLUMNS}"
                ))
                .bind(id)
                .bind(error)
                .fetch_optional(&self.pool)
                .await
            }
        }
    }
}

#[async_trait]
impl DraftStore for PgDraftStore {
    async fn get_draft_by_id(&self, id: Uuid) -> Result<Option<ProductDraft>, StoreError> {
        let row = sqlx::query_as::<_, DraftRow>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM product_drafts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(ProductDraft::try_from).transpose()
    }

    async fn get_drafts_by_status(
        &self,
        status: DraftStatus,
        limit: usize,
    ) -> Result<Vec<ProductDraft>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, DraftRow>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM product_drafts \
             WHERE status = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2"
        ))
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(ProductDraft::try_from).collect()
    }

    async fn update_draft(
        &self,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<ProductDraft, StoreError> {
        let row = self
            .apply_update(id, update)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound(id))?;
        tracing::debug!(draft_id = %id, status = %row.status, "draft updated");
        ProductDraft::try_from(row)
    }
}
