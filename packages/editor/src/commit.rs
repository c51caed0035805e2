//! # Commit Engine
//!
//! Revision-gated commits for one open template.
//!
//! ```text
//! Idle ──edit──▶ Dirty ──commit──▶ Committing ──▶ Idle
//!                                            ├──▶ Conflict
//!                                            └──▶ Failed
//! ```
//!
//! The engine owns a commit cursor: the last revision this session knows
//! the store to be at. The cursor is locked for the whole store round trip,
//! so commits from one session are strictly ordered and each one is based
//! on the revision the previous one produced.

use crate::merge::TemplatePatch;
use crate::store::{CommitKind, CommitRequest, StoreError, TemplateStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard};

const REFRESH_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitState {
    Idle,
    Dirty,
    Committing,
    Conflict,
    Failed,
}

/// Announced after every successful commit so previews can reload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSignal {
    pub template_id: String,
    pub revision: u64,
    pub kind: CommitKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("Template changed elsewhere: based on revision {base}, store is at {current}")]
    Conflict { base: u64, current: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Patch rejected: {0}")]
    SchemaParse(String),

    #[error("Template not found: {0}")]
    NotFound(String),
}

impl From<StoreError> for CommitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { expected, actual } => CommitError::Conflict {
                base: expected,
                current: actual,
            },
            StoreError::NotFound(id) => CommitError::NotFound(id),
            StoreError::Invalid(message) => CommitError::SchemaParse(message),
            StoreError::Unavailable(message) => CommitError::Network(message),
        }
    }
}

impl CommitError {
    fn state(&self) -> CommitState {
        match self {
            CommitError::Conflict { .. } => CommitState::Conflict,
            _ => CommitState::Failed,
        }
    }
}

pub struct CommitEngine {
    store: Arc<dyn TemplateStore>,
    template_id: String,
    cursor: Mutex<Option<u64>>,
    state: watch::Sender<CommitState>,
    refresh: broadcast::Sender<RefreshSignal>,
}

impl CommitEngine {
    pub fn new(store: Arc<dyn TemplateStore>, template_id: impl Into<String>) -> Self {
        let (state, _) = watch::channel(CommitState::Idle);
        let (refresh, _) = broadcast::channel(REFRESH_CAPACITY);
        Self {
            store,
            template_id: template_id.into(),
            cursor: Mutex::new(None),
            state,
            refresh,
        }
    }

    /// Start from a revision already known, e.g. the one just loaded
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.cursor = Mutex::new(Some(revision));
        self
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Read the store's current revision and cache it
    pub async fn load_revision(&self) -> Result<u64, CommitError> {
        let mut guard = self.begin().await;
        guard.refresh().await
    }

    /// Acquire the commit cursor; waits for any commit in flight
    pub async fn begin(&self) -> CommitGuard<'_> {
        CommitGuard {
            engine: self,
            cursor: self.cursor.lock().await,
        }
    }

    pub async fn commit(&self, patch: TemplatePatch, kind: CommitKind) -> Result<u64, CommitError> {
        self.begin().await.commit(patch, kind).await
    }

    /// Note a local edit; ignored while a commit is in flight
    pub fn mark_dirty(&self) {
        self.state.send_if_modified(|state| match state {
            CommitState::Dirty | CommitState::Committing => false,
            _ => {
                *state = CommitState::Dirty;
                true
            }
        });
    }

    pub fn mark_idle(&self) {
        self.state.send_if_modified(|state| {
            if *state == CommitState::Idle {
                return false;
            }
            *state = CommitState::Idle;
            true
        });
    }

    pub fn state(&self) -> CommitState {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<CommitState> {
        self.state.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshSignal> {
        self.refresh.subscribe()
    }
}

impl std::fmt::Debug for CommitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitEngine")
            .field("template_id", &self.template_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Exclusive hold on the commit cursor
pub struct CommitGuard<'a> {
    engine: &'a CommitEngine,
    cursor: MutexGuard<'a, Option<u64>>,
}

impl CommitGuard<'_> {
    /// Cached base revision, loaded from the store on first use
    pub async fn base_revision(&mut self) -> Result<u64, CommitError> {
        match *self.cursor {
            Some(revision) => Ok(revision),
            None => self.refresh().await,
        }
    }

    pub fn set_revision(&mut self, revision: u64) {
        *self.cursor = Some(revision);
    }

    async fn refresh(&mut self) -> Result<u64, CommitError> {
        let info = self
            .engine
            .store
            .read_revision(&self.engine.template_id)
            .await?;
        tracing::debug!(
            "template {}: store at revision {}",
            self.engine.template_id,
            info.revision
        );
        *self.cursor = Some(info.revision);
        Ok(info.revision)
    }

    /// Send `patch` against the cached revision
    pub async fn commit(mut self, patch: TemplatePatch, kind: CommitKind) -> Result<u64, CommitError> {
        let engine = self.engine;
        let base_rev = match self.base_revision().await {
            Ok(revision) => revision,
            Err(err) => {
                engine.state.send_replace(err.state());
                return Err(err);
            }
        };

        engine.state.send_replace(CommitState::Committing);
        tracing::debug!("template {}: {} commit on revision {}", engine.template_id, kind, base_rev);

        let request = CommitRequest {
            id: engine.template_id.clone(),
            base_rev,
            patch,
            kind,
        };
        match engine.store.commit(request).await {
            Ok(response) => {
                *self.cursor = Some(response.revision);
                engine.state.send_replace(CommitState::Idle);
                tracing::info!(
                    "template {}: {} committed revision {}",
                    engine.template_id,
                    kind,
                    response.revision
                );
                // No subscribers is fine
                let _ = engine.refresh.send(RefreshSignal {
                    template_id: engine.template_id.clone(),
                    revision: response.revision,
                    kind,
                });
                Ok(response.revision)
            }
            Err(err) => {
                let err = CommitError::from(err);
                engine.state.send_replace(err.state());
                tracing::warn!("template {}: {} commit failed: {}", engine.template_id, kind, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::template::Template;

    fn engine() -> (Arc<MemoryStore>, CommitEngine) {
        let store = Arc::new(MemoryStore::new());
        let mut template = Template::new("tpl_1");
        template.revision = 5;
        store.insert(template);
        let engine = CommitEngine::new(store.clone(), "tpl_1");
        (store, engine)
    }

    fn patch(slug: &str) -> TemplatePatch {
        TemplatePatch::new().column("slug", slug)
    }

    #[tokio::test]
    async fn test_commit_advances_cursor_and_signals() {
        let (_store, engine) = engine();
        let mut refresh = engine.subscribe();

        assert_eq!(engine.commit(patch("a"), CommitKind::Save).await.unwrap(), 6);
        assert_eq!(engine.commit(patch("b"), CommitKind::Autosave).await.unwrap(), 7);
        assert_eq!(engine.state(), CommitState::Idle);

        let signal = refresh.recv().await.unwrap();
        assert_eq!(signal.revision, 6);
        assert_eq!(signal.kind, CommitKind::Save);
    }

    #[tokio::test]
    async fn test_conflict_keeps_stale_cursor() {
        let (store, engine) = engine();
        let engine = engine.with_revision(4);

        let err = engine.commit(patch("a"), CommitKind::Save).await.unwrap_err();
        assert_eq!(err, CommitError::Conflict { base: 4, current: 5 });
        assert_eq!(engine.state(), CommitState::Conflict);

        // Retrying without a reload fails the same way
        assert!(engine.commit(patch("a"), CommitKind::Save).await.is_err());
        assert!(store.commits().is_empty());

        assert_eq!(engine.load_revision().await.unwrap(), 5);
        assert_eq!(engine.commit(patch("a"), CommitKind::Save).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_store_errors_map_to_failed() {
        let (store, engine) = engine();
        store.fail_next_commit(StoreError::Unavailable("offline".into()));
        let err = engine.commit(patch("a"), CommitKind::Autosave).await.unwrap_err();
        assert!(matches!(err, CommitError::Network(_)));
        assert_eq!(engine.state(), CommitState::Failed);

        store.fail_next_commit(StoreError::Invalid("bad".into()));
        let err = engine.commit(patch("a"), CommitKind::Autosave).await.unwrap_err();
        assert!(matches!(err, CommitError::SchemaParse(_)));
    }

    #[test]
    fn test_mark_dirty_transitions() {
        let (_store, engine) = engine();
        let mut watch = engine.watch();
        engine.mark_dirty();
        assert_eq!(engine.state(), CommitState::Dirty);
        assert!(watch.has_changed().unwrap());
        let _ = watch.borrow_and_update();

        engine.mark_dirty();
        assert!(!watch.has_changed().unwrap());

        engine.mark_idle();
        assert_eq!(engine.state(), CommitState::Idle);
    }
}
