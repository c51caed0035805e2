//! Error types for the editor

use crate::commit::CommitError;
use crate::gate::GateIssue;
use crate::merge::MergeError;
use crate::mutations::MutationError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Save blocked by {} issue(s)", .0.len())]
    Blocked(Vec<GateIssue>),

    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Slug changes must be checked against the slug directory")]
    SlugCheckRequired,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EditorError::Commit(CommitError::Conflict { .. })
                | EditorError::Store(StoreError::Conflict { .. })
        )
    }
}
