//! Block registry: which block types a host offers and how to create them.

use crate::block::{Block, BlockContent};
use crate::error::{BlockError, BlockResult};
use crate::kind::{BlockKind, UnknownKind};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRegistry {
    kinds: Vec<BlockKind>,
}

impl BlockRegistry {
    /// Registry offering every built-in block type
    pub fn new() -> Self {
        Self {
            kinds: BlockKind::ALL.to_vec(),
        }
    }

    /// Registry restricted to `kinds`, in the given order
    pub fn with_kinds(kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        let mut enabled = Vec::new();
        for kind in kinds {
            if !enabled.contains(&kind) {
                enabled.push(kind);
            }
        }
        Self { kinds: enabled }
    }

    pub fn kinds(&self) -> &[BlockKind] {
        &self.kinds
    }

    pub fn is_enabled(&self, kind: BlockKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn schema_for(&self, kind: BlockKind) -> Schema {
        schema_for(kind)
    }

    /// A minimally valid block of `kind`, rejecting disabled kinds
    pub fn create_default(&self, kind: BlockKind) -> BlockResult<Block> {
        if !self.is_enabled(kind) {
            return Err(BlockError::KindDisabled(kind));
        }
        Ok(create_default(kind))
    }

    /// Parse a type name, accepting legacy spellings
    pub fn parse_kind(&self, name: &str) -> Result<BlockKind, UnknownKind> {
        BlockKind::parse(name).ok_or_else(|| UnknownKind(name.to_string()))
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn schema_for(kind: BlockKind) -> Schema {
    BlockContent::schema_of(kind)
}

/// A minimally valid block of `kind` with a fresh id
pub fn create_default(kind: BlockKind) -> Block {
    Block::new(BlockContent::default_for(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_registry() {
        let registry = BlockRegistry::with_kinds([BlockKind::Text, BlockKind::Hero, BlockKind::Text]);

        assert_eq!(registry.kinds(), &[BlockKind::Text, BlockKind::Hero]);
        assert!(registry.create_default(BlockKind::Hero).is_ok());
        assert!(matches!(
            registry.create_default(BlockKind::Grid),
            Err(BlockError::KindDisabled(BlockKind::Grid))
        ));
    }

    #[test]
    fn test_parse_kind_legacy_spellings() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.parse_kind("callToAction"), Ok(BlockKind::Cta));
        assert_eq!(registry.parse_kind("gridBlocks"), Ok(BlockKind::Grid));
        assert!(registry.parse_kind("carousel").is_err());
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = schema_for(BlockKind::Hero);
        let required: Vec<_> = schema.required_fields().map(|f| f.name).collect();
        assert_eq!(required, vec!["headline"]);
    }
}
