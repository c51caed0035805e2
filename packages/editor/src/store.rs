//! # Template Store
//!
//! The persistence collaborator. Commits are compare-and-increment: the
//! caller names the revision its patch was built against, and the store
//! rejects the patch if anyone else committed first.

use crate::merge::{merge_template, TemplatePatch};
use crate::template::Template;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitKind {
    Autosave,
    Save,
}

impl std::fmt::Display for CommitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitKind::Autosave => f.write_str("autosave"),
            CommitKind::Save => f.write_str("save"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub id: String,
    pub base_rev: u64,
    pub patch: TemplatePatch,
    pub kind: CommitKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    pub revision: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Revision conflict: expected {expected}, store has {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid patch: {0}")]
    Invalid(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureStatus {
    Conflict,
    Invalid,
    NotFound,
    Unavailable,
}

/// Error body of a rejected commit on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitFailure {
    pub error: String,
    pub status: FailureStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<u64>,
}

impl From<&StoreError> for CommitFailure {
    fn from(err: &StoreError) -> Self {
        let (status, expected, actual) = match err {
            StoreError::Conflict { expected, actual } => {
                (FailureStatus::Conflict, Some(*expected), Some(*actual))
            }
            StoreError::NotFound(_) => (FailureStatus::NotFound, None, None),
            StoreError::Invalid(_) => (FailureStatus::Invalid, None, None),
            StoreError::Unavailable(_) => (FailureStatus::Unavailable, None, None),
        };
        Self {
            error: err.to_string(),
            status,
            expected,
            actual,
        }
    }
}

impl From<CommitFailure> for StoreError {
    fn from(failure: CommitFailure) -> Self {
        match failure.status {
            FailureStatus::Conflict => StoreError::Conflict {
                expected: failure.expected.unwrap_or_default(),
                actual: failure.actual.unwrap_or_default(),
            },
            FailureStatus::NotFound => StoreError::NotFound(failure.error),
            FailureStatus::Invalid => StoreError::Invalid(failure.error),
            FailureStatus::Unavailable => StoreError::Unavailable(failure.error),
        }
    }
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn read_revision(&self, id: &str) -> Result<RevisionInfo, StoreError>;

    async fn load(&self, id: &str) -> Result<Template, StoreError>;

    /// Atomically check `base_rev`, merge the patch and bump the revision
    async fn commit(&self, request: CommitRequest) -> Result<CommitResponse, StoreError>;
}

#[async_trait]
pub trait SlugDirectory: Send + Sync {
    /// Whether `slug` is used by any template other than `except_template`
    async fn is_taken(&self, slug: &str, except_template: Option<&str>) -> Result<bool, StoreError>;
}

#[derive(Debug)]
struct StoredTemplate {
    template: Template,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    templates: HashMap<String, StoredTemplate>,
    published: HashSet<String>,
    fail_next: Option<StoreError>,
    commits: Vec<CommitRequest>,
    latency: Duration,
}

/// In-process store and slug directory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, template: Template) {
        self.state().templates.insert(
            template.id.clone(),
            StoredTemplate {
                template,
                updated_at: None,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        self.state().templates.get(id).map(|stored| stored.template.clone())
    }

    /// Reserve a slug as published by some other site
    pub fn publish_slug(&self, slug: impl Into<String>) {
        self.state().published.insert(slug.into());
    }

    /// Fail the next commit with `error` without touching stored state
    pub fn fail_next_commit(&self, error: StoreError) {
        self.state().fail_next = Some(error);
    }

    /// Delay every commit round trip
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    /// Accepted commits, oldest first
    pub fn commits(&self) -> Vec<CommitRequest> {
        self.state().commits.clone()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn read_revision(&self, id: &str) -> Result<RevisionInfo, StoreError> {
        let state = self.state();
        let stored = state
            .templates
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(RevisionInfo {
            revision: stored.template.revision,
            updated_at: stored.updated_at,
        })
    }

    async fn load(&self, id: &str) -> Result<Template, StoreError> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn commit(&self, request: CommitRequest) -> Result<CommitResponse, StoreError> {
        let latency = self.state().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        let stored = state
            .templates
            .get_mut(&request.id)
            .ok_or_else(|| StoreError::NotFound(request.id.clone()))?;

        let current = stored.template.revision;
        if request.base_rev != current {
            return Err(StoreError::Conflict {
                expected: request.base_rev,
                actual: current,
            });
        }

        let mut merged = merge_template(&stored.template, &request.patch)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        merged.revision = current + 1;
        stored.template = merged;
        stored.updated_at = Some(Utc::now());

        let revision = current + 1;
        state.commits.push(request);
        Ok(CommitResponse { revision })
    }
}

#[async_trait]
impl SlugDirectory for MemoryStore {
    async fn is_taken(&self, slug: &str, except_template: Option<&str>) -> Result<bool, StoreError> {
        let state = self.state();
        if state.published.contains(slug) {
            return Ok(true);
        }
        Ok(state
            .templates
            .values()
            .any(|stored| stored.template.slug == slug && Some(stored.template.id.as_str()) != except_template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let mut template = Template::new("tpl_1");
        template.revision = 5;
        template.slug = "acme".into();
        store.insert(template);
        store
    }

    fn request(base_rev: u64) -> CommitRequest {
        CommitRequest {
            id: "tpl_1".into(),
            base_rev,
            patch: TemplatePatch::new().column("slug", "acme-co"),
            kind: CommitKind::Save,
        }
    }

    #[tokio::test]
    async fn test_commit_increments_revision() {
        let store = store();
        let response = store.commit(request(5)).await.unwrap();
        assert_eq!(response.revision, 6);

        let info = store.read_revision("tpl_1").await.unwrap();
        assert_eq!(info.revision, 6);
        assert!(info.updated_at.is_some());
        assert_eq!(store.get("tpl_1").unwrap().slug, "acme-co");
    }

    #[tokio::test]
    async fn test_commit_stores_merged_template() {
        let store = store();
        let before = store.get("tpl_1").unwrap();
        let patch = TemplatePatch::new()
            .column("name", "Acme Salon")
            .body("pages", json!([{ "id": "p1", "slug": "home", "title": "Home" }]))
            .body("theme", json!({ "color": "red" }))
            .body("meta", json!({ "industry": "salon" }));

        let mut expected = merge_template(&before, &patch).unwrap();
        expected.revision = before.revision + 1;

        let response = store
            .commit(CommitRequest {
                id: "tpl_1".into(),
                base_rev: 5,
                patch,
                kind: CommitKind::Save,
            })
            .await
            .unwrap();
        assert_eq!(response.revision, 6);

        let stored = store.get("tpl_1").unwrap();
        assert_eq!(stored, expected);
        assert_eq!(stored.pages.len(), 1);
        assert_eq!(stored.identity.name, "Acme Salon");
        assert_eq!(stored.identity.industry.as_ref().map(|i| i.key.as_str()), Some("salon"));
    }

    #[tokio::test]
    async fn test_malformed_patch_is_refused() {
        let store = store();
        let err = store
            .commit(CommitRequest {
                id: "tpl_1".into(),
                base_rev: 5,
                patch: TemplatePatch::new().body("pages", 42),
                kind: CommitKind::Autosave,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(store.read_revision("tpl_1").await.unwrap().revision, 5);
        assert!(store.commits().is_empty());
    }

    #[tokio::test]
    async fn test_stale_base_is_rejected() {
        let store = store();
        let err = store.commit(request(4)).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict { expected: 4, actual: 5 });
        assert_eq!(store.get("tpl_1").unwrap().slug, "acme");
        assert!(store.commits().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = store();
        store.fail_next_commit(StoreError::Unavailable("offline".into()));
        assert!(matches!(store.commit(request(5)).await, Err(StoreError::Unavailable(_))));
        assert_eq!(store.commit(request(5)).await.unwrap().revision, 6);
    }

    #[tokio::test]
    async fn test_slug_directory_excludes_own_template() {
        let store = store();
        store.publish_slug("taken");
        assert!(store.is_taken("acme", None).await.unwrap());
        assert!(!store.is_taken("acme", Some("tpl_1")).await.unwrap());
        assert!(store.is_taken("taken", Some("tpl_1")).await.unwrap());
        assert!(!store.is_taken("free", None).await.unwrap());
    }

    #[test]
    fn test_commit_failure_round_trip() {
        let err = StoreError::Conflict { expected: 5, actual: 6 };
        let failure = CommitFailure::from(&err);
        let wire = serde_json::to_value(&failure).unwrap();
        assert_eq!(wire["status"], "conflict");

        let back: CommitFailure = serde_json::from_value(wire).unwrap();
        assert_eq!(StoreError::from(back), err);
    }
}
