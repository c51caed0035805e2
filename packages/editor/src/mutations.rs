//! # Template Mutations
//!
//! One mutation per UI gesture. Every surface (forms, preview, toolbar,
//! JSON view) edits the document through these, so each edit is validated
//! and recorded the same way.
//!
//! ## Semantics
//!
//! - Blocks are addressed by id wherever they live: page bodies, page
//!   chrome overrides, site chrome, grid cells
//! - Content updates merge into the existing content, then re-normalize;
//!   the block id, tags and meta are kept
//! - Inserted blocks whose id already exists in the document get a fresh id
//! - Moves clamp the target index; inserts reject an index past the end

use crate::identity::{build_identity_patch, IdentityDraft};
use crate::merge::{merge_template, merge_value, MergeError, TemplatePatch};
use crate::template::{ChromeSlot, Page, Template};
use pagecraft_blocks::{autofix, normalize, Block, BlockContent, BlockError, BlockKind, BlockRegistry};
use pagecraft_common::{new_block_id, new_page_id, normalize_slug};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Merge `content` into a block's content
    #[serde(rename_all = "camelCase")]
    UpdateBlock { block_id: String, content: Value },

    /// Insert a default block of `kind`
    #[serde(rename_all = "camelCase")]
    InsertBlock {
        page_id: String,
        #[serde(default)]
        index: Option<usize>,
        kind: BlockKind,
    },

    /// Insert a block given as raw (possibly legacy) JSON
    #[serde(rename_all = "camelCase")]
    InsertRawBlock {
        page_id: String,
        #[serde(default)]
        index: Option<usize>,
        block: Value,
    },

    #[serde(rename_all = "camelCase")]
    RemoveBlock { block_id: String },

    /// Move a block into a page body at index
    #[serde(rename_all = "camelCase")]
    MoveBlock {
        block_id: String,
        page_id: String,
        index: usize,
    },

    #[serde(rename_all = "camelCase")]
    AutofixBlock { block_id: String },

    AddPage { page: Page },

    #[serde(rename_all = "camelCase")]
    RemovePage { page_id: String },

    #[serde(rename_all = "camelCase")]
    UpdatePage {
        page_id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        slug: Option<String>,
        #[serde(default)]
        show_header: Option<bool>,
        #[serde(default)]
        show_footer: Option<bool>,
    },

    #[serde(rename_all = "camelCase")]
    MovePage { page_id: String, index: usize },

    /// Set or clear a page's header/footer override
    #[serde(rename_all = "camelCase")]
    SetPageChrome {
        page_id: String,
        slot: ChromeSlot,
        #[serde(default)]
        block: Option<Value>,
    },

    /// Set or clear the site-wide header/footer
    SetSiteChrome {
        slot: ChromeSlot,
        #[serde(default)]
        block: Option<Value>,
    },

    SetSiteSlug { slug: String },

    SetIdentity(IdentityDraft),

    ApplyPatch(TemplatePatch),
}

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    #[error("Block type {0} is not enabled")]
    KindDisabled(BlockKind),

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid block: {0}")]
    Block(#[from] BlockError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),
}

/// Result of applying a mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationResult {
    /// Blocks whose validation is stale
    pub affected_blocks: Vec<String>,

    /// Id of the block or page the mutation created
    pub created_id: Option<String>,
}

impl MutationResult {
    fn blocks(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            affected_blocks: ids.into_iter().collect(),
            created_id: None,
        }
    }

    fn created(id: String, affected: Vec<String>) -> Self {
        Self {
            affected_blocks: affected,
            created_id: Some(id),
        }
    }
}

impl Mutation {
    /// True when the edit can introduce a page or site slug
    pub fn changes_slugs(&self) -> bool {
        match self {
            Mutation::AddPage { .. } | Mutation::SetSiteSlug { .. } => true,
            Mutation::UpdatePage { slug, .. } => slug.is_some(),
            Mutation::ApplyPatch(patch) => patch.columns.contains_key("slug") || patch.pages().is_some(),
            _ => false,
        }
    }

    /// Apply to `template` in place.
    ///
    /// On error the template may be partially modified; callers apply to a
    /// working copy.
    pub fn apply(
        &self,
        template: &mut Template,
        registry: &BlockRegistry,
    ) -> Result<MutationResult, MutationError> {
        match self {
            Mutation::UpdateBlock { block_id, content } => {
                Self::apply_update_block(template, block_id, content)
            }

            Mutation::InsertBlock { page_id, index, kind } => {
                let block = registry.create_default(*kind).map_err(|err| match err {
                    BlockError::KindDisabled(kind) => MutationError::KindDisabled(kind),
                    other => MutationError::Block(other),
                })?;
                Self::apply_insert(template, page_id, *index, block)
            }

            Mutation::InsertRawBlock { page_id, index, block } => {
                let block = normalize(block)?;
                if let Some(kind) = block.kind() {
                    if !registry.is_enabled(kind) {
                        return Err(MutationError::KindDisabled(kind));
                    }
                }
                Self::apply_insert(template, page_id, *index, block)
            }

            Mutation::RemoveBlock { block_id } => {
                let removed = template
                    .remove_block(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                Ok(MutationResult::blocks(ids_of(&removed)))
            }

            Mutation::MoveBlock { block_id, page_id, index } => {
                if template.page(page_id).is_none() {
                    return Err(MutationError::PageNotFound(page_id.clone()));
                }
                let block = template
                    .remove_block(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                let page = template
                    .page_mut(page_id)
                    .ok_or_else(|| MutationError::PageNotFound(page_id.clone()))?;
                let index = (*index).min(page.blocks.len());
                page.blocks.insert(index, block);
                Ok(MutationResult::blocks([block_id.clone()]))
            }

            Mutation::AutofixBlock { block_id } => {
                let block = template
                    .find_block_mut(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                let outcome = autofix(block);
                let affected = ids_of(&outcome.block);
                *block = outcome.block;
                Ok(MutationResult::blocks(affected))
            }

            Mutation::AddPage { page } => Self::apply_add_page(template, page.clone()),

            Mutation::RemovePage { page_id } => {
                let index = template
                    .page_index(page_id)
                    .ok_or_else(|| MutationError::PageNotFound(page_id.clone()))?;
                let page = template.pages.remove(index);
                let mut affected = Vec::new();
                for block in page_blocks(&page) {
                    affected.extend(ids_of(block));
                }
                Ok(MutationResult::blocks(affected))
            }

            Mutation::UpdatePage {
                page_id,
                title,
                slug,
                show_header,
                show_footer,
            } => Self::apply_update_page(
                template,
                page_id,
                title.as_deref(),
                slug.as_deref(),
                *show_header,
                *show_footer,
            ),

            Mutation::MovePage { page_id, index } => {
                let from = template
                    .page_index(page_id)
                    .ok_or_else(|| MutationError::PageNotFound(page_id.clone()))?;
                let page = template.pages.remove(from);
                let index = (*index).min(template.pages.len());
                template.pages.insert(index, page);
                Ok(MutationResult::default())
            }

            Mutation::SetPageChrome { page_id, slot, block } => {
                let block = Self::chrome_block(template, *slot, block.as_ref())?;
                let page = template
                    .page_mut(page_id)
                    .ok_or_else(|| MutationError::PageNotFound(page_id.clone()))?;
                let affected = Self::replace_chrome(page.chrome_mut(*slot), block);
                Ok(MutationResult::blocks(affected))
            }

            Mutation::SetSiteChrome { slot, block } => {
                let block = Self::chrome_block(template, *slot, block.as_ref())?;
                let affected = Self::replace_chrome(template.chrome_mut(*slot), block);
                Ok(MutationResult::blocks(affected))
            }

            Mutation::SetSiteSlug { slug } => {
                template.slug =
                    normalize_slug(slug).map_err(|_| MutationError::InvalidSlug(slug.clone()))?;
                Ok(MutationResult::default())
            }

            Mutation::SetIdentity(draft) => {
                let patch = build_identity_patch(draft, template);
                *template = merge_template(template, &patch)?;
                Ok(MutationResult::default())
            }

            Mutation::ApplyPatch(patch) => {
                *template = merge_template(template, patch)?;
                Ok(MutationResult::blocks(template.block_ids()))
            }
        }
    }

    fn apply_update_block(
        template: &mut Template,
        block_id: &str,
        content: &Value,
    ) -> Result<MutationResult, MutationError> {
        if !content.is_object() {
            return Err(MutationError::InvalidStructure(
                "block content must be an object".to_string(),
            ));
        }
        let block = template
            .find_block_mut(block_id)
            .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))?;

        let mut merged = serde_json::to_value(&block.content).map_err(BlockError::from)?;
        merge_value(&mut merged, content);

        let updated = match (&block.content, block.kind(), merged) {
            (_, Some(kind), Value::Object(fields)) => BlockContent::from_raw(kind, &fields),
            (BlockContent::Unknown { type_name, .. }, None, merged) => BlockContent::Unknown {
                type_name: type_name.clone(),
                content: merged,
            },
            _ => {
                return Err(MutationError::InvalidStructure(
                    "block content must be an object".to_string(),
                ))
            }
        };
        block.content = updated;

        Ok(MutationResult::blocks(ids_of(block)))
    }

    fn apply_insert(
        template: &mut Template,
        page_id: &str,
        index: Option<usize>,
        mut block: Block,
    ) -> Result<MutationResult, MutationError> {
        let mut taken: HashSet<String> = template.block_ids().into_iter().collect();
        reassign_duplicate_ids(&mut block, &mut taken);

        let page = template
            .page_mut(page_id)
            .ok_or_else(|| MutationError::PageNotFound(page_id.to_string()))?;
        let len = page.blocks.len();
        let index = match index {
            Some(index) if index > len => return Err(MutationError::IndexOutOfRange { index, len }),
            Some(index) => index,
            None => len,
        };

        let id = block.id.clone();
        let affected = ids_of(&block);
        page.blocks.insert(index, block);
        Ok(MutationResult::created(id, affected))
    }

    fn apply_add_page(template: &mut Template, mut page: Page) -> Result<MutationResult, MutationError> {
        let source = if page.slug.trim().is_empty() { &page.title } else { &page.slug };
        page.slug =
            normalize_slug(source).map_err(|_| MutationError::InvalidSlug(source.clone()))?;
        if template.page_by_slug(&page.slug).is_some() {
            return Err(MutationError::SlugTaken(page.slug));
        }
        if template.page(&page.id).is_some() || page.id.is_empty() {
            page.id = new_page_id();
        }

        let mut taken: HashSet<String> = template.block_ids().into_iter().collect();
        let mut affected = Vec::new();
        for block in page_blocks_mut(&mut page) {
            reassign_duplicate_ids(block, &mut taken);
            affected.extend(ids_of(block));
        }

        let id = page.id.clone();
        template.pages.push(page);
        Ok(MutationResult::created(id, affected))
    }

    fn apply_update_page(
        template: &mut Template,
        page_id: &str,
        title: Option<&str>,
        slug: Option<&str>,
        show_header: Option<bool>,
        show_footer: Option<bool>,
    ) -> Result<MutationResult, MutationError> {
        let slug = match slug {
            Some(slug) => {
                let slug = normalize_slug(slug).map_err(|_| MutationError::InvalidSlug(slug.to_string()))?;
                if template
                    .pages
                    .iter()
                    .any(|page| page.slug == slug && page.id != page_id)
                {
                    return Err(MutationError::SlugTaken(slug));
                }
                Some(slug)
            }
            None => None,
        };

        let page = template
            .page_mut(page_id)
            .ok_or_else(|| MutationError::PageNotFound(page_id.to_string()))?;
        if let Some(title) = title {
            page.title = title.trim().to_string();
        }
        if let Some(slug) = slug {
            page.slug = slug;
        }
        if let Some(show) = show_header {
            page.show_header = show;
        }
        if let Some(show) = show_footer {
            page.show_footer = show;
        }

        Ok(MutationResult::default())
    }

    /// Normalize a chrome block, checking it fits the slot
    fn chrome_block(
        template: &Template,
        slot: ChromeSlot,
        raw: Option<&Value>,
    ) -> Result<Option<Block>, MutationError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut block = normalize(raw)?;

        let expected = match slot {
            ChromeSlot::Header => BlockKind::Header,
            ChromeSlot::Footer => BlockKind::Footer,
        };
        if block.kind() != Some(expected) {
            return Err(MutationError::InvalidStructure(format!(
                "{} slot needs a {} block, got {:?}",
                expected,
                expected,
                block.type_name()
            )));
        }

        let mut taken: HashSet<String> = template.block_ids().into_iter().collect();
        // Replacing a slot may keep the id of the block it replaces
        if let Some(existing) = template.chrome(slot) {
            taken.remove(&existing.id);
        }
        reassign_duplicate_ids(&mut block, &mut taken);
        Ok(Some(block))
    }

    fn replace_chrome(slot: &mut Option<Block>, block: Option<Block>) -> Vec<String> {
        let mut affected: Vec<String> = slot.iter().flat_map(ids_of).collect();
        if let Some(block) = &block {
            affected.extend(ids_of(block));
        }
        *slot = block;
        affected
    }
}

/// Ids of a block and its descendants
fn ids_of(block: &Block) -> Vec<String> {
    let mut ids = Vec::new();
    block.walk(&mut |nested| ids.push(nested.id.clone()));
    ids
}

fn page_blocks(page: &Page) -> impl Iterator<Item = &Block> {
    page.custom_header
        .iter()
        .chain(page.custom_footer.iter())
        .chain(page.blocks.iter())
}

fn page_blocks_mut(page: &mut Page) -> impl Iterator<Item = &mut Block> {
    page.custom_header
        .iter_mut()
        .chain(page.custom_footer.iter_mut())
        .chain(page.blocks.iter_mut())
}

fn reassign_duplicate_ids(block: &mut Block, taken: &mut HashSet<String>) {
    if !taken.insert(block.id.clone()) {
        let fresh = new_block_id();
        tracing::debug!("block id {} already in use, reassigned {}", block.id, fresh);
        block.id = fresh.clone();
        taken.insert(fresh);
    }
    if let Some(children) = block.children_mut() {
        for child in children {
            reassign_duplicate_ids(child, taken);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Template {
        Template::from_stored(&json!({
            "id": "tpl_1",
            "data": { "pages": [
                { "id": "home", "slug": "home", "title": "Home", "blocks": [
                    { "id": "hero", "type": "hero", "content": { "headline": "Hi" } },
                    { "id": "txt", "type": "text", "content": { "body": "Body" } }
                ] },
                { "id": "about", "slug": "about", "title": "About" }
            ] }
        }))
        .unwrap()
    }

    fn apply(template: &mut Template, mutation: Mutation) -> Result<MutationResult, MutationError> {
        mutation.apply(template, &BlockRegistry::new())
    }

    #[test]
    fn test_slug_changing_edits() {
        let rename = |slug: Option<&str>| Mutation::UpdatePage {
            page_id: "about".into(),
            title: Some("About".into()),
            slug: slug.map(String::from),
            show_header: None,
            show_footer: None,
        };
        assert!(rename(Some("team")).changes_slugs());
        assert!(!rename(None).changes_slugs());
        assert!(Mutation::SetSiteSlug { slug: "x".into() }.changes_slugs());
        assert!(Mutation::ApplyPatch(TemplatePatch::new().column("slug", "x")).changes_slugs());
        assert!(Mutation::ApplyPatch(TemplatePatch::new().body("pages", json!([]))).changes_slugs());
        assert!(!Mutation::ApplyPatch(TemplatePatch::new().body("theme", json!({}))).changes_slugs());
        assert!(!Mutation::RemovePage { page_id: "about".into() }.changes_slugs());
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::UpdateBlock {
            block_id: "hero".to_string(),
            content: json!({ "headline": "New" }),
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json, json!({ "UpdateBlock": { "blockId": "hero", "content": { "headline": "New" } } }));
        let deserialized: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_update_block_merges_content() {
        let mut template = template();
        apply(
            &mut template,
            Mutation::UpdateBlock {
                block_id: "hero".into(),
                content: json!({ "subheadline": "Since 1998" }),
            },
        )
        .unwrap();

        let hero = template.find_block("hero").unwrap().to_value().unwrap();
        assert_eq!(hero["content"]["headline"], "Hi");
        assert_eq!(hero["content"]["subheadline"], "Since 1998");
    }

    #[test]
    fn test_insert_block_and_index_bounds() {
        let mut template = template();
        let result = apply(
            &mut template,
            Mutation::InsertBlock { page_id: "home".into(), index: Some(1), kind: BlockKind::Button },
        )
        .unwrap();

        let created = result.created_id.unwrap();
        assert_eq!(template.pages[0].blocks[1].id, created);

        let err = apply(
            &mut template,
            Mutation::InsertBlock { page_id: "home".into(), index: Some(9), kind: BlockKind::Button },
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::IndexOutOfRange { index: 9, len: 3 }));
    }

    #[test]
    fn test_disabled_kind_rejected() {
        let mut template = template();
        let registry = BlockRegistry::with_kinds([BlockKind::Text]);
        let err = Mutation::InsertBlock { page_id: "home".into(), index: None, kind: BlockKind::Grid }
            .apply(&mut template, &registry)
            .unwrap_err();
        assert!(matches!(err, MutationError::KindDisabled(BlockKind::Grid)));
    }

    #[test]
    fn test_pasted_block_gets_fresh_id() {
        let mut template = template();
        let result = apply(
            &mut template,
            Mutation::InsertRawBlock {
                page_id: "about".into(),
                index: None,
                block: json!({ "id": "hero", "type": "banner", "title": "Copy" }),
            },
        )
        .unwrap();

        let created = result.created_id.unwrap();
        assert_ne!(created, "hero");
        assert_eq!(template.block_ids().iter().filter(|id| *id == "hero").count(), 1);
    }

    #[test]
    fn test_move_block_between_pages() {
        let mut template = template();
        apply(
            &mut template,
            Mutation::MoveBlock { block_id: "txt".into(), page_id: "about".into(), index: 5 },
        )
        .unwrap();

        assert_eq!(template.pages[0].blocks.len(), 1);
        assert_eq!(template.pages[1].blocks[0].id, "txt");
    }

    #[test]
    fn test_page_slugs_must_be_unique() {
        let mut template = template();
        let err = apply(&mut template, Mutation::AddPage { page: Page::new("About", "") }).unwrap_err();
        assert!(matches!(err, MutationError::SlugTaken(slug) if slug == "about"));

        let err = apply(
            &mut template,
            Mutation::UpdatePage {
                page_id: "about".into(),
                title: None,
                slug: Some("Home".into()),
                show_header: None,
                show_footer: Some(false),
            },
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::SlugTaken(_)));
    }

    #[test]
    fn test_chrome_slot_checks_kind() {
        let mut template = template();
        let err = apply(
            &mut template,
            Mutation::SetSiteChrome { slot: ChromeSlot::Header, block: Some(json!({ "type": "text" })) },
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidStructure(_)));

        apply(
            &mut template,
            Mutation::SetPageChrome {
                page_id: "about".into(),
                slot: ChromeSlot::Footer,
                block: Some(json!({ "id": "foot", "type": "footer", "copyright": "(c) Acme" })),
            },
        )
        .unwrap();
        assert!(template.find_block("foot").is_some());

        let result = apply(&mut template, Mutation::RemoveBlock { block_id: "foot".into() }).unwrap();
        assert_eq!(result.affected_blocks, vec!["foot".to_string()]);
        assert!(template.pages[1].custom_footer.is_none());
    }

    #[test]
    fn test_set_site_slug_normalizes() {
        let mut template = template();
        apply(&mut template, Mutation::SetSiteSlug { slug: "Acme Plumbing!".into() }).unwrap();
        assert_eq!(template.slug, "acme-plumbing");

        let err = apply(&mut template, Mutation::SetSiteSlug { slug: "!!".into() }).unwrap_err();
        assert!(matches!(err, MutationError::InvalidSlug(_)));
    }
}
