//! In-memory template model.
//!
//! One canonical representation: a single `pages` vector and one
//! [`Identity`]. The stored mirrors are produced by [`crate::projection`].

use crate::identity::Identity;
use pagecraft_blocks::Block;
use pagecraft_common::new_page_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which chrome slot a header/footer block occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChromeSlot {
    Header,
    Footer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default = "new_page_id")]
    pub id: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "sections")]
    pub blocks: Vec<Block>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_header: Option<Block>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_footer: Option<Block>,

    #[serde(default = "default_true")]
    pub show_header: bool,

    #[serde(default = "default_true")]
    pub show_footer: bool,
}

fn default_true() -> bool {
    true
}

impl Page {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: new_page_id(),
            slug: slug.into(),
            title: title.into(),
            blocks: Vec::new(),
            custom_header: None,
            custom_footer: None,
            show_header: true,
            show_footer: true,
        }
    }

    pub fn chrome(&self, slot: ChromeSlot) -> Option<&Block> {
        match slot {
            ChromeSlot::Header => self.custom_header.as_ref(),
            ChromeSlot::Footer => self.custom_footer.as_ref(),
        }
    }

    pub fn chrome_mut(&mut self, slot: ChromeSlot) -> &mut Option<Block> {
        match slot {
            ChromeSlot::Header => &mut self.custom_header,
            ChromeSlot::Footer => &mut self.custom_footer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub revision: u64,
    pub slug: String,
    pub identity: Identity,
    pub pages: Vec<Page>,
    pub header_block: Option<Block>,
    pub footer_block: Option<Block>,

    /// `data.meta` without the legacy identity keys
    pub meta: Map<String, Value>,

    /// Top-level columns this model does not interpret (`status`, ...)
    pub columns: Map<String, Value>,

    /// Unknown `data` keys, preserved verbatim
    pub extra: Map<String, Value>,
}

impl Template {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            revision: 0,
            slug: String::new(),
            identity: Identity::default(),
            pages: Vec::new(),
            header_block: None,
            footer_block: None,
            meta: Map::new(),
            columns: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn chrome(&self, slot: ChromeSlot) -> Option<&Block> {
        match slot {
            ChromeSlot::Header => self.header_block.as_ref(),
            ChromeSlot::Footer => self.footer_block.as_ref(),
        }
    }

    pub fn chrome_mut(&mut self, slot: ChromeSlot) -> &mut Option<Block> {
        match slot {
            ChromeSlot::Header => &mut self.header_block,
            ChromeSlot::Footer => &mut self.footer_block,
        }
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == page_id)
    }

    pub fn page_mut(&mut self, page_id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|page| page.id == page_id)
    }

    pub fn page_index(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.id == page_id)
    }

    pub fn page_by_slug(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.slug == slug)
    }

    /// Every top-level block: site chrome, then each page's overrides and body
    pub fn root_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.header_block
            .iter()
            .chain(self.footer_block.iter())
            .chain(self.pages.iter().flat_map(|page| {
                page.custom_header
                    .iter()
                    .chain(page.custom_footer.iter())
                    .chain(page.blocks.iter())
            }))
    }

    fn root_blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> + '_ {
        self.header_block
            .iter_mut()
            .chain(self.footer_block.iter_mut())
            .chain(self.pages.iter_mut().flat_map(|page| {
                page.custom_header
                    .iter_mut()
                    .chain(page.custom_footer.iter_mut())
                    .chain(page.blocks.iter_mut())
            }))
    }

    /// Visit every block, nested grid cells included
    pub fn walk_blocks(&self, visit: &mut dyn FnMut(&Block)) {
        for block in self.root_blocks() {
            block.walk(visit);
        }
    }

    pub fn block_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        self.walk_blocks(&mut |block| ids.push(block.id.clone()));
        ids
    }

    pub fn find_block(&self, block_id: &str) -> Option<&Block> {
        self.root_blocks().find_map(|block| block.find(block_id))
    }

    pub fn find_block_mut(&mut self, block_id: &str) -> Option<&mut Block> {
        self.root_blocks_mut().find_map(|block| block.find_mut(block_id))
    }

    /// Remove a block wherever it lives
    pub fn remove_block(&mut self, block_id: &str) -> Option<Block> {
        for slot in [ChromeSlot::Header, ChromeSlot::Footer] {
            let chrome = self.chrome_mut(slot);
            if chrome.as_ref().map_or(false, |block| block.id == block_id) {
                return chrome.take();
            }
        }

        for page in &mut self.pages {
            for slot in [ChromeSlot::Header, ChromeSlot::Footer] {
                let chrome = page.chrome_mut(slot);
                if chrome.as_ref().map_or(false, |block| block.id == block_id) {
                    return chrome.take();
                }
            }
            if let Some(pos) = page.blocks.iter().position(|block| block.id == block_id) {
                return Some(page.blocks.remove(pos));
            }
        }

        self.root_blocks_mut()
            .find_map(|block| block.remove_descendant(block_id))
    }
}
