//! # Undo/Redo History
//!
//! Bounded stack of full-document snapshots.
//!
//! ## Design
//!
//! - Each edit records the document as it was before the edit
//! - Undo swaps the current document for the most recent snapshot and
//!   keeps the current one for redo
//! - New edits clear the redo stack
//! - Batches group several edits into one undo step; the batch keeps the
//!   snapshot taken before its first edit
//! - When full, the oldest snapshot is dropped
//!
//! History is local to one open document and never touches persistence.

use crate::template::Template;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Document state before one undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: Template,

    /// Optional description of this step
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(snapshot: Template) -> Self {
        Self {
            snapshot,
            description: None,
        }
    }
}

#[derive(Debug)]
pub struct HistoryStack {
    /// Snapshots to undo to (most recent last)
    undo_stack: VecDeque<HistoryEntry>,

    /// Snapshots to redo to (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Open batch; `None` inside means no edit has happened in it yet
    current_batch: Option<Option<HistoryEntry>>,

    batch_description: Option<String>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
            batch_description: None,
        }
    }

    /// Record the document as it was before an edit
    pub fn push(&mut self, snapshot: Template) {
        self.push_entry(HistoryEntry::new(snapshot));
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        match self.current_batch.as_mut() {
            Some(first) => {
                if first.is_none() {
                    *first = Some(entry);
                }
            }
            None => self.push_step(entry),
        }
    }

    pub fn begin_batch(&mut self) {
        self.end_batch();
        self.current_batch = Some(None);
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if self.current_batch.is_some() {
            self.batch_description = Some(description.into());
        }
    }

    /// Close the open batch; an empty batch records nothing
    pub fn end_batch(&mut self) {
        let description = self.batch_description.take();
        if let Some(Some(mut entry)) = self.current_batch.take() {
            if description.is_some() {
                entry.description = description;
            }
            self.push_step(entry);
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push_step(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }

        self.redo_stack.clear();
    }

    /// Step back: returns the snapshot to restore and keeps `current` for redo
    pub fn undo(&mut self, current: Template) -> Option<Template> {
        self.end_batch();
        let entry = self.undo_stack.pop_back()?;

        self.redo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: Template) -> Option<Template> {
        self.end_batch();
        let entry = self.redo_stack.pop()?;

        self.undo_stack.push_back(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
        self.batch_description = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .back()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}
