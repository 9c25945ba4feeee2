//! The draft store interface and an in-process implementation.
//!
//! Access is plain read-then-write. Nothing here provides compare-and-set,
//! so two workflows running against the same draft id can both observe
//! `pending_translation` and proceed.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::drafts::{DraftStatus, DraftUpdate, ProductDraft};
use crate::StoreError;

#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Returns `Ok(None)` when no draft has this id.
    async fn get_draft_by_id(&self, id: Uuid) -> Result<Option<ProductDraft>, StoreError>;

    /// Drafts in `status`, oldest first, at most `limit` of them.
    async fn get_drafts_by_status(
        &self,
        status: DraftStatus,
        limit: usize,
    ) -> Result<Vec<ProductDraft>, StoreError>;

    /// Applies `update` and returns the draft as stored afterwards.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the draft vanished between read and write.
    async fn update_draft(
        &self,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<ProductDraft, StoreError>;
}

/// Insertion-ordered in-memory store. Records every applied update so
/// callers can inspect the transition sequence.
#[derive(Default)]
pub struct InMemoryDraftStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    drafts: Vec<ProductDraft>,
    history: Vec<(Uuid, DraftUpdate)>,
}

impl InMemoryDraftStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_drafts(drafts: Vec<ProductDraft>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                drafts,
                history: Vec::new(),
            }),
        }
    }

    pub async fn insert(&self, draft: ProductDraft) {
        self.inner.lock().await.drafts.push(draft);
    }

    /// Every update applied so far, in order.
    pub async fn history(&self) -> Vec<(Uuid, DraftUpdate)> {
        self.inner.lock().await.history.clone()
    }

    pub async fn snapshot(&self) -> Vec<ProductDraft> {
        self.inner.lock().await.drafts.clone()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn get_draft_by_id(&self, id: Uuid) -> Result<Option<ProductDraft>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.drafts.iter().find(|d| d.id == id).cloned())
    }

    async fn get_drafts_by_status(
        &self,
        status: DraftStatus,
        limit: usize,
    ) -> Result<Vec<ProductDraft>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .drafts
            .iter()
            .filter(|d| d.status == status)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_draft(
        &self,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<ProductDraft, StoreError> {
        let mut inner = self.inner.lock().await;
        let draft = inner
            .drafts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;
        draft.apply(update);
        let updated = draft.clone();
        inner.history.push((id, update.clone()));
        Ok(updated)
    }
}
