//! # Document Session
//!
//! One handle per open template. The session owns the editable document,
//! the commit engine and the autosave timer; clones share them.
//!
//! Edits are synchronous and local. Every edit marks the session dirty and
//! re-arms autosave. Commits always send the full current projection, built
//! after the commit cursor is acquired, so a snapshot can never land on a
//! revision older than one this session already produced.

use crate::autosave::AutosaveScheduler;
use crate::commit::{CommitEngine, CommitState, RefreshSignal};
use crate::config::SessionConfig;
use crate::document::{TemplateDocument, ValidationReport};
use crate::errors::EditorError;
use crate::gate::{check_template, GateReport};
use crate::history::HistoryStack;
use crate::mutations::{Mutation, MutationResult};
use crate::store::{CommitKind, SlugDirectory, TemplateStore};
use crate::template::{Page, Template};
use pagecraft_common::{new_session_id, normalize_slug, slug_candidates, slugify};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};

const DEFAULT_PAGE_SLUG: &str = "page";

struct Shared {
    id: String,
    template_id: String,
    config: SessionConfig,
    document: Mutex<TemplateDocument>,
    engine: CommitEngine,
    autosave: AutosaveScheduler,
    store: Arc<dyn TemplateStore>,
    directory: Mutex<Option<Arc<dyn SlugDirectory>>>,
}

#[derive(Clone)]
pub struct DocumentSession {
    shared: Arc<Shared>,
}

impl DocumentSession {
    /// Load `template_id` and start editing it
    pub async fn open(
        store: Arc<dyn TemplateStore>,
        template_id: &str,
        config: SessionConfig,
    ) -> Result<Self, EditorError> {
        let template = store.load(template_id).await?;
        let revision = template.revision;
        let document =
            TemplateDocument::with_history(template, HistoryStack::with_max_levels(config.history_depth));

        let id = new_session_id();
        tracing::debug!("session {}: opened template {} at revision {}", id, template_id, revision);

        Ok(Self {
            shared: Arc::new(Shared {
                id,
                template_id: template_id.to_string(),
                engine: CommitEngine::new(Arc::clone(&store), template_id).with_revision(revision),
                autosave: AutosaveScheduler::new(config.debounce()),
                config,
                document: Mutex::new(document),
                store,
                directory: Mutex::new(None),
            }),
        })
    }

    /// Check slugs against other templates and published sites
    pub fn with_directory(self, directory: Arc<dyn SlugDirectory>) -> Self {
        *lock(&self.shared.directory) = Some(directory);
        self
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn template_id(&self) -> &str {
        &self.shared.template_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    fn document(&self) -> MutexGuard<'_, TemplateDocument> {
        lock(&self.shared.document)
    }

    fn directory(&self) -> Option<Arc<dyn SlugDirectory>> {
        lock(&self.shared.directory).clone()
    }

    /// Apply one edit to the draft.
    ///
    /// With a slug directory attached, edits that change slugs are refused;
    /// use [`add_page`](Self::add_page), [`rename_page`](Self::rename_page)
    /// or [`set_site_slug`](Self::set_site_slug) instead.
    pub fn apply(&self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        self.ensure_unchecked_allowed(&mutation)?;
        self.apply_checked(&mutation)
    }

    fn apply_checked(&self, mutation: &Mutation) -> Result<MutationResult, EditorError> {
        let result = self.document().apply(mutation)?;
        self.touched();
        Ok(result)
    }

    fn ensure_unchecked_allowed(&self, mutation: &Mutation) -> Result<(), EditorError> {
        if mutation.changes_slugs() && self.directory().is_some() {
            return Err(EditorError::SlugCheckRequired);
        }
        Ok(())
    }

    /// Apply several edits as one undo step; stops at the first failure
    pub fn apply_batch(
        &self,
        description: &str,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> Result<Vec<MutationResult>, EditorError> {
        let mutations: Vec<Mutation> = mutations.into_iter().collect();
        for mutation in &mutations {
            self.ensure_unchecked_allowed(mutation)?;
        }

        let mut results = Vec::new();
        let outcome = {
            let mut document = self.document();
            document.begin_batch(Some(description));
            let mut outcome = Ok(());
            for mutation in mutations {
                match document.apply(&mutation) {
                    Ok(result) => results.push(result),
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                }
            }
            document.end_batch();
            outcome
        };
        if !results.is_empty() {
            self.touched();
        }
        outcome?;
        Ok(results)
    }

    pub fn undo(&self) -> bool {
        let undone = self.document().undo();
        if undone {
            self.touched();
        }
        undone
    }

    pub fn redo(&self) -> bool {
        let redone = self.document().redo();
        if redone {
            self.touched();
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.document().history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document().history().can_redo()
    }

    /// Add a page, deriving a free slug from the title when none is given
    pub async fn add_page(&self, title: &str, slug: Option<&str>) -> Result<String, EditorError> {
        let title = title.trim();
        let slug = match slug {
            Some(requested) => {
                let slug = normalize_slug(requested)
                    .map_err(|_| EditorError::InvalidSlug(requested.to_string()))?;
                if self.page_slug_taken(&slug, None).await? {
                    return Err(EditorError::SlugTaken(slug));
                }
                slug
            }
            None => {
                let mut base = slugify(title);
                if base.is_empty() {
                    base = DEFAULT_PAGE_SLUG.to_string();
                }
                let mut chosen = None;
                for candidate in slug_candidates(&base) {
                    if !self.page_slug_taken(&candidate, None).await? {
                        chosen = Some(candidate);
                        break;
                    }
                }
                chosen.ok_or(EditorError::SlugTaken(base))?
            }
        };

        let page = Page::new(title, slug);
        let page_id = page.id.clone();
        let result = self.apply_checked(&Mutation::AddPage { page })?;
        Ok(result.created_id.unwrap_or(page_id))
    }

    /// Change a page's slug after checking it is free
    pub async fn rename_page(&self, page_id: &str, slug: &str) -> Result<String, EditorError> {
        let normalized =
            normalize_slug(slug).map_err(|_| EditorError::InvalidSlug(slug.to_string()))?;
        if self.page_slug_taken(&normalized, Some(page_id)).await? {
            return Err(EditorError::SlugTaken(normalized));
        }
        self.apply_checked(&Mutation::UpdatePage {
            page_id: page_id.to_string(),
            title: None,
            slug: Some(normalized.clone()),
            show_header: None,
            show_footer: None,
        })?;
        Ok(normalized)
    }

    async fn page_slug_taken(&self, slug: &str, except_page: Option<&str>) -> Result<bool, EditorError> {
        let local = self
            .document()
            .draft()
            .pages
            .iter()
            .any(|page| page.slug == slug && Some(page.id.as_str()) != except_page);
        if local {
            return Ok(true);
        }
        match self.directory() {
            Some(directory) => Ok(directory.is_taken(slug, Some(self.template_id())).await?),
            None => Ok(false),
        }
    }

    /// Change the site slug after checking it is free
    pub async fn set_site_slug(&self, slug: &str) -> Result<String, EditorError> {
        let normalized =
            normalize_slug(slug).map_err(|_| EditorError::InvalidSlug(slug.to_string()))?;
        if let Some(directory) = self.directory() {
            if directory.is_taken(&normalized, Some(self.template_id())).await? {
                return Err(EditorError::SlugTaken(normalized));
            }
        }
        self.apply_checked(&Mutation::SetSiteSlug {
            slug: normalized.clone(),
        })?;
        Ok(normalized)
    }

    pub fn snapshot(&self) -> Template {
        self.document().draft().clone()
    }

    pub fn revision(&self) -> u64 {
        self.document().draft().revision
    }

    pub fn validation_report(&self) -> ValidationReport {
        self.document().validation_report()
    }

    pub fn publish_check(&self) -> GateReport {
        let document = self.document();
        check_template(document.draft(), document.validator())
    }

    pub fn is_dirty(&self) -> bool {
        self.document().is_dirty()
    }

    pub fn autosave_pending(&self) -> bool {
        self.shared.autosave.is_pending()
    }

    pub fn commit_state(&self) -> CommitState {
        self.shared.engine.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<CommitState> {
        self.shared.engine.watch()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshSignal> {
        self.shared.engine.subscribe()
    }

    /// Explicit save: cancels pending autosave, applies the publish gate, always commits
    pub async fn save(&self) -> Result<u64, EditorError> {
        self.shared.autosave.cancel();

        if self.shared.config.gate_on_save {
            let report = self.publish_check();
            if report.is_blocking() {
                tracing::warn!(
                    "session {}: save blocked by {} issue(s)",
                    self.shared.id,
                    report.hard.len()
                );
                return Err(EditorError::Blocked(report.hard));
            }
        }

        let committed = self.commit_current(CommitKind::Save).await?;
        Ok(committed.unwrap_or_else(|| self.revision()))
    }

    /// Commit now if anything changed since the last commit
    pub async fn autosave_now(&self) -> Result<Option<u64>, EditorError> {
        self.shared.autosave.cancel();
        self.commit_current(CommitKind::Autosave).await
    }

    async fn commit_current(&self, kind: CommitKind) -> Result<Option<u64>, EditorError> {
        let guard = self.shared.engine.begin().await;

        let (patch, seq) = {
            let document = self.document();
            if kind == CommitKind::Autosave && !document.is_dirty() {
                tracing::debug!("session {}: nothing to autosave", self.shared.id);
                return Ok(None);
            }
            (document.draft().to_patch()?, document.edit_seq())
        };

        let revision = guard.commit(patch, kind).await?;

        let still_dirty = {
            let mut document = self.document();
            document.mark_committed(seq, revision);
            document.is_dirty()
        };
        if still_dirty {
            self.shared.engine.mark_dirty();
        }
        Ok(Some(revision))
    }

    /// Refresh the base revision after a conflict; local edits are kept
    pub async fn reload_revision(&self) -> Result<u64, EditorError> {
        let revision = self.shared.engine.load_revision().await?;
        let dirty = {
            let mut document = self.document();
            document.set_revision(revision);
            document.is_dirty()
        };
        if dirty {
            self.shared.engine.mark_dirty();
        } else {
            self.shared.engine.mark_idle();
        }
        Ok(revision)
    }

    /// Discard the draft and history, reloading the stored template
    pub async fn resync(&self) -> Result<u64, EditorError> {
        self.shared.autosave.cancel();
        let mut guard = self.shared.engine.begin().await;
        let template = self.shared.store.load(&self.shared.template_id).await?;
        let revision = template.revision;
        self.document().replace(template);
        guard.set_revision(revision);
        drop(guard);

        self.shared.engine.mark_idle();
        tracing::debug!("session {}: resynced at revision {}", self.shared.id, revision);
        Ok(revision)
    }

    fn touched(&self) {
        self.shared.engine.mark_dirty();
        self.schedule_autosave();
    }

    fn schedule_autosave(&self) {
        let session = Arc::downgrade(&self.shared);
        self.shared.autosave.schedule(move || async move {
            let Some(shared) = session.upgrade() else {
                return;
            };
            let session = DocumentSession { shared };
            if let Err(err) = session.commit_current(CommitKind::Autosave).await {
                tracing::warn!("session {}: autosave failed: {}", session.shared.id, err);
            }
        });
    }
}

impl std::fmt::Debug for DocumentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSession")
            .field("id", &self.shared.id)
            .field("template_id", &self.shared.template_id)
            .field("state", &self.shared.engine.state())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
