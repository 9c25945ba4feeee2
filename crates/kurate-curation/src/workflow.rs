//! Translate one stored draft and persist the outcome.

use chrono::Utc;
use kurate_core::{AiFields, DraftStore, DraftUpdate, ProductDraft};
use uuid::Uuid;

use crate::error::CurationError;
use crate::prompt::RawProduct;
use crate::translate::TranslationService;

/// A translated or reverted draft plus, on failure, the typed error that
/// was recorded into `translation_error`.
#[derive(Debug)]
pub struct DraftOutcome {
    pub draft: ProductDraft,
    pub failure: Option<CurationError>,
}

/// Translates draft `id` and returns it as stored afterwards.
///
/// Translation failures do not surface as `Err`: they are written to the
/// draft's `translation_error` and the draft goes back to
/// `pending_translation`.
///
/// # Errors
///
/// [`CurationError::DraftNotFound`] for an unknown id,
/// [`CurationError::Store`] when the draft cannot be read.
pub async fn translate_and_save_draft(
    store: &dyn DraftStore,
    service: &TranslationService,
    id: Uuid,
) -> Result<ProductDraft, CurationError> {
    translate_draft(store, service, id)
        .await
        .map(|outcome| outcome.draft)
}

/// [`translate_and_save_draft`], keeping the typed failure for callers
/// that classify it.
///
/// # Errors
///
/// Same as [`translate_and_save_draft`].
pub async fn translate_draft(
    store: &dyn DraftStore,
    service: &TranslationService,
    id: Uuid,
) -> Result<DraftOutcome, CurationError> {
    let draft = store
        .get_draft_by_id(id)
        .await?
        .ok_or(CurationError::DraftNotFound { id })?;

    // No compare-and-set: a concurrent run on the same id is not excluded.
    if let Err(e) = store.update_draft(id, &DraftUpdate::MarkTranslating).await {
        return Ok(record_failure(store, draft, CurationError::Store(e)).await);
    }

    let raw = RawProduct {
        name: &draft.raw_name,
        description: &draft.raw_description,
        price_text: &draft.raw_price_text,
    };
    let result = match service.translate_product(raw).await {
        Ok(result) => result,
        Err(e) => return Ok(record_failure(store, draft, e).await),
    };

    let update = DraftUpdate::Translated(AiFields {
        result,
        model: service.model().to_owned(),
        translated_at: Utc::now(),
    });
    match store.update_draft(id, &update).await {
        Ok(saved) => {
            tracing::info!(
                draft_id = %id,
                model = service.model(),
                name = saved.ai_name.as_deref().unwrap_or_default(),
                "draft translated"
            );
            Ok(DraftOutcome {
                draft: saved,
                failure: None,
            })
        }
        Err(e) => Ok(record_failure(store, draft, CurationError::Store(e)).await),
    }
}

/// Reverts the draft to `pending_translation` with the error recorded.
/// When even that write fails, the returned draft is the local copy with
/// the update applied; the stored row may still read `translating`.
async fn record_failure(
    store: &dyn DraftStore,
    mut draft: ProductDraft,
    error: CurationError,
) -> DraftOutcome {
    tracing::warn!(draft_id = %draft.id, error = %error, "draft translation failed");

    let update = DraftUpdate::TranslationFailed {
        error: error.to_string(),
    };
    let draft = match store.update_draft(draft.id, &update).await {
        Ok(saved) => saved,
        Err(write_err) => {
            tracing::error!(
                draft_id = %draft.id,
                error = %write_err,
                "failed to record translation failure"
            );
            draft.apply(&update);
            draft
        }
    };

    DraftOutcome {
        draft,
        failure: Some(error),
    }
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
