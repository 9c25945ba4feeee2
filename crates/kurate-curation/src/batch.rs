//! Sequential translation of pending drafts with a rate-limit breaker.

use std::sync::Arc;
use std::time::Duration;

use kurate_core::{DraftStatus, DraftStore};
use serde::Serialize;

use crate::translate::TranslationService;
use crate::workflow::translate_draft;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Drafts attempted, including the one that tripped the breaker.
    pub processed: usize,
    pub translated: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
    pub rate_limited: bool,
    pub notice: Option<String>,
}

pub struct BatchTranslator {
    store: Arc<dyn DraftStore>,
    service: TranslationService,
    delay: Duration,
}

impl BatchTranslator {
    #[must_use]
    pub fn new(store: Arc<dyn DraftStore>, service: TranslationService) -> Self {
        Self {
            store,
            service,
            delay: DEFAULT_DELAY,
        }
    }

    /// Pause awaited before every draft except the first.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Translates up to `limit` pending drafts one at a time. Stops early
    /// on the first rate-limit failure. Never fails: listing errors are
    /// reported inside the summary.
    pub async fn batch_translate(&self, limit: usize) -> BatchSummary {
        let mut summary = BatchSummary::default();

        let drafts = match self
            .store
            .get_drafts_by_status(DraftStatus::PendingTranslation, limit)
            .await
        {
            Ok(drafts) => drafts,
            Err(e) => {
                tracing::error!(error = %e, "failed to list pending drafts");
                summary.errors += 1;
                summary
                    .error_details
                    .push(format!("failed to list pending drafts: {e}"));
                return summary;
            }
        };
        let total = drafts.len();
        tracing::info!(total, limit, "starting translation batch");

        for (index, draft) in drafts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }
            summary.processed += 1;

            let failure = match translate_draft(self.store.as_ref(), &self.service, draft.id).await
            {
                Ok(outcome) => outcome.failure,
                Err(e) => Some(e),
            };

            let Some(err) = failure else {
                summary.translated += 1;
                continue;
            };

            summary.errors += 1;
            summary.error_details.push(format!("{}: {err}", draft.id));

            if err.is_rate_limit() {
                let notice = format!(
                    "rate limit reached after {} of {total} drafts; remaining drafts left pending",
                    summary.processed
                );
                tracing::warn!(draft_id = %draft.id, error = %err, "{notice}");
                summary.rate_limited = true;
                summary.notice = Some(notice);
                break;
            }
        }

        tracing::info!(
            processed = summary.processed,
            translated = summary.translated,
            errors = summary.errors,
            rate_limited = summary.rate_limited,
            "translation batch complete"
        );
        summary
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
