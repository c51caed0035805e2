//! # Pagecraft Editor
//!
//! Document synchronization core for site templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ blocks: raw JSON → typed, validated blocks  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Template lifecycle + mutations      │
//! │  - Project to/from the stored shape         │
//! │  - Apply mutations with validation          │
//! │  - Bounded undo/redo                        │
//! │  - Revision-gated commits with autosave     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: compare-and-increment persistence    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One canonical model**: mirrors (`data.site.pages`, legacy identity
//!    keys) exist only in the stored shape and are rebuilt on every write
//! 2. **Optimistic concurrency**: commits name their base revision; a stale
//!    base is a conflict, never a silent overwrite
//! 3. **Local first**: edits never wait on the network and a failed commit
//!    leaves the draft intact
//! 4. **Per-document sessions**: no process-wide caches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{DocumentSession, MemoryStore, Mutation, SessionConfig};
//!
//! let store = Arc::new(MemoryStore::new());
//! let session = DocumentSession::open(store, "tpl_1", SessionConfig::default()).await?;
//!
//! session.apply(Mutation::UpdateBlock {
//!     block_id: "hero-1".to_string(),
//!     content: json!({ "headline": "Fresh bread daily" }),
//! })?;
//!
//! // Autosave fires after the debounce window; an explicit save commits now
//! let revision = session.save().await?;
//! ```

mod autosave;
mod commit;
mod config;
mod document;
mod errors;
mod gate;
mod history;
mod identity;
mod merge;
mod mutations;
mod projection;
mod session;
mod store;
mod template;

pub use autosave::AutosaveScheduler;
pub use commit::{CommitEngine, CommitError, CommitGuard, CommitState, RefreshSignal};
pub use config::{SessionConfig, DEFAULT_AUTOSAVE_DEBOUNCE_MS};
pub use document::{TemplateDocument, ValidationReport};
pub use errors::EditorError;
pub use gate::{check_stored, check_template, GateIssue, GateReport};
pub use history::{HistoryEntry, HistoryStack, DEFAULT_HISTORY_DEPTH};
pub use identity::{
    build_identity_patch, catalog, lookup_industry, resolve_industry, Identity, IdentityDraft, Industry,
    PartialIdentity, META_IDENTITY_KEYS, OTHER_INDUSTRY,
};
pub use merge::{merge_template, merge_value, MergeError, TemplatePatch};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use projection::pages_mirror_mismatch;
pub use session::DocumentSession;
pub use store::{
    CommitFailure, CommitKind, CommitRequest, CommitResponse, FailureStatus, MemoryStore, RevisionInfo,
    SlugDirectory, StoreError, TemplateStore,
};
pub use template::{ChromeSlot, Page, Template};

// Re-export block types for convenience
pub use pagecraft_blocks::{Block, BlockKind, BlockRegistry, ValidationError, Validator};
