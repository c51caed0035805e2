//! # Template Document
//!
//! The editable draft of one template together with its history, the
//! per-block validation cache and dirty tracking.
//!
//! Every edit bumps `edit_seq`. A commit captures the sequence number of
//! the snapshot it sent; the document is clean again only when that
//! number is still current once the commit lands.

use crate::history::HistoryStack;
use crate::mutations::{Mutation, MutationError, MutationResult};
use crate::template::Template;
use pagecraft_blocks::{BlockRegistry, ValidationError, Validator};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Validation errors of a whole document, grouped by block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn for_block<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |error| error.block_id == block_id)
    }

    pub fn fixable(&self) -> usize {
        self.errors.iter().filter(|error| error.is_fixable()).count()
    }
}

#[derive(Debug)]
pub struct TemplateDocument {
    draft: Template,
    history: HistoryStack,
    errors: BTreeMap<String, Vec<ValidationError>>,
    validator: Validator,
    registry: BlockRegistry,
    edit_seq: u64,
    committed_seq: u64,
}

impl TemplateDocument {
    pub fn new(template: Template) -> Self {
        Self::with_history(template, HistoryStack::new())
    }

    pub fn with_history(template: Template, history: HistoryStack) -> Self {
        let mut document = Self {
            draft: template,
            history,
            errors: BTreeMap::new(),
            validator: Validator::new(),
            registry: BlockRegistry::new(),
            edit_seq: 0,
            committed_seq: 0,
        };
        document.revalidate_all();
        document
    }

    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self.revalidate_all();
        self
    }

    pub fn draft(&self) -> &Template {
        &self.draft
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Apply a mutation to a working copy; the draft changes only on success
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationResult, MutationError> {
        let mut working = self.draft.clone();
        let result = mutation.apply(&mut working, &self.registry)?;

        let previous = std::mem::replace(&mut self.draft, working);
        self.history.push(previous);
        self.edit_seq += 1;

        self.revalidate(&result.affected_blocks);
        Ok(result)
    }

    /// Group the following edits into one undo step
    pub fn begin_batch(&mut self, description: Option<&str>) {
        self.history.begin_batch();
        if let Some(description) = description {
            self.history.set_batch_description(description);
        }
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.draft.clone()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.draft.clone()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Swap in a history snapshot; the revision stays the one last committed
    fn restore(&mut self, mut snapshot: Template) {
        snapshot.revision = self.draft.revision;
        self.draft = snapshot;
        self.edit_seq += 1;
        self.revalidate_all();
    }

    /// Replace the draft with a freshly loaded template, dropping history
    pub fn replace(&mut self, template: Template) {
        self.draft = template;
        self.history.clear();
        self.edit_seq += 1;
        self.committed_seq = self.edit_seq;
        self.revalidate_all();
    }

    pub fn edit_seq(&self) -> u64 {
        self.edit_seq
    }

    pub fn is_dirty(&self) -> bool {
        self.edit_seq != self.committed_seq
    }

    /// Record that the snapshot taken at `seq` was committed at `revision`
    pub fn mark_committed(&mut self, seq: u64, revision: u64) {
        self.committed_seq = self.committed_seq.max(seq);
        self.draft.revision = self.draft.revision.max(revision);
    }

    pub fn set_revision(&mut self, revision: u64) {
        self.draft.revision = revision;
    }

    pub fn errors_for(&self, block_id: &str) -> &[ValidationError] {
        self.errors.get(block_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validation_report(&self) -> ValidationReport {
        ValidationReport {
            errors: self.errors.values().flatten().cloned().collect(),
        }
    }

    fn revalidate(&mut self, affected: &[String]) {
        let live: HashSet<String> = self.draft.block_ids().into_iter().collect();
        self.errors.retain(|id, _| live.contains(id));

        for id in affected {
            self.errors.remove(id);
        }
        for id in affected {
            if let Some(block) = self.draft.find_block(id) {
                self.record(block.id.clone(), self.validator.validate(block));
            }
        }
    }

    fn revalidate_all(&mut self) {
        self.errors.clear();
        let mut found = Vec::new();
        for block in self.draft.root_blocks() {
            found.extend(self.validator.validate(block));
        }
        for error in found {
            self.errors.entry(error.block_id.clone()).or_default().push(error);
        }
    }

    /// Store errors reported while validating `block_id`, which may name nested blocks
    fn record(&mut self, block_id: String, errors: Vec<ValidationError>) {
        self.errors.remove(&block_id);
        for error in errors {
            let entry = self.errors.entry(error.block_id.clone()).or_default();
            if !entry.contains(&error) {
                entry.push(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_blocks::BlockKind;
    use serde_json::json;

    fn document() -> TemplateDocument {
        let template = Template::from_stored(&json!({
            "id": "tpl_1",
            "revision": 4,
            "data": { "pages": [{ "id": "home", "slug": "home", "blocks": [
                { "id": "hero", "type": "hero", "content": { "headline": "Hi" } }
            ] }] }
        }))
        .unwrap();
        TemplateDocument::new(template)
    }

    #[test]
    fn test_failed_mutation_leaves_draft() {
        let mut doc = document();
        let before = doc.draft().clone();

        let result = doc.apply(&Mutation::RemoveBlock { block_id: "missing".into() });
        assert!(result.is_err());
        assert_eq!(doc.draft(), &before);
        assert!(!doc.is_dirty());
        assert!(!doc.history().can_undo());
    }

    #[test]
    fn test_validation_cache_follows_edits() {
        let mut doc = document();
        assert!(doc.validation_report().is_clean());

        doc.apply(&Mutation::UpdateBlock {
            block_id: "hero".into(),
            content: json!({ "headline": "" }),
        })
        .unwrap();
        assert_eq!(doc.errors_for("hero").len(), 1);
        assert_eq!(doc.validation_report().fixable(), 1);

        doc.apply(&Mutation::AutofixBlock { block_id: "hero".into() }).unwrap();
        assert!(doc.errors_for("hero").is_empty());

        doc.apply(&Mutation::RemoveBlock { block_id: "hero".into() }).unwrap();
        assert!(doc.validation_report().is_clean());
    }

    #[test]
    fn test_undo_keeps_revision_and_dirties() {
        let mut doc = document();
        doc.apply(&Mutation::InsertBlock { page_id: "home".into(), index: None, kind: BlockKind::Text })
            .unwrap();
        doc.mark_committed(doc.edit_seq(), 5);
        assert!(!doc.is_dirty());

        assert!(doc.undo());
        assert_eq!(doc.draft().revision, 5);
        assert_eq!(doc.draft().pages[0].blocks.len(), 1);
        assert!(doc.is_dirty());

        assert!(doc.redo());
        assert_eq!(doc.draft().pages[0].blocks.len(), 2);
    }

    #[test]
    fn test_stale_commit_does_not_clean() {
        let mut doc = document();
        doc.apply(&Mutation::SetSiteSlug { slug: "one".into() }).unwrap();
        let sent = doc.edit_seq();
        doc.apply(&Mutation::SetSiteSlug { slug: "two".into() }).unwrap();

        doc.mark_committed(sent, 5);
        assert!(doc.is_dirty());
    }
}
