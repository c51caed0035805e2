//! The block sum type.
//!
//! A [`Block`] is one typed unit of page content. Its identity (`id`) is
//! assigned once, by the normalizer or by [`Block::new`], and every edit
//! preserves it. Deserializing a block always goes through
//! [`crate::normalize`], so legacy shapes are canonicalized on read.

use crate::content::{
    AudioContent, ButtonContent, ContentSchema, CtaContent, FooterContent, GridContent,
    HeaderContent, HeroContent, ImageContent, QuoteContent, SchedulerContent, ServicesContent,
    TestimonialContent, TextContent, VideoContent,
};
use crate::kind::BlockKind;
use crate::schema::Schema;
use crate::validate::{Checker, ErrorCode, ValidationError};
use pagecraft_common::new_block_id;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Audit/UX annotations; never validated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl BlockMeta {
    pub fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.summary.is_none() && self.comment.is_none()
    }
}

/// Typed content payload, one variant per block type
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(TextContent),
    Image(ImageContent),
    Video(VideoContent),
    Audio(AudioContent),
    Hero(HeroContent),
    Cta(CtaContent),
    Quote(QuoteContent),
    Button(ButtonContent),
    Testimonial(TestimonialContent),
    Header(HeaderContent),
    Footer(FooterContent),
    Grid(GridContent),
    Services(ServicesContent),
    Scheduler(SchedulerContent),

    /// A type this build does not know; kept verbatim so it survives saves
    Unknown { type_name: String, content: Value },
}

impl BlockContent {
    pub fn kind(&self) -> Option<BlockKind> {
        let kind = match self {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Image(_) => BlockKind::Image,
            BlockContent::Video(_) => BlockKind::Video,
            BlockContent::Audio(_) => BlockKind::Audio,
            BlockContent::Hero(_) => BlockKind::Hero,
            BlockContent::Cta(_) => BlockKind::Cta,
            BlockContent::Quote(_) => BlockKind::Quote,
            BlockContent::Button(_) => BlockKind::Button,
            BlockContent::Testimonial(_) => BlockKind::Testimonial,
            BlockContent::Header(_) => BlockKind::Header,
            BlockContent::Footer(_) => BlockKind::Footer,
            BlockContent::Grid(_) => BlockKind::Grid,
            BlockContent::Services(_) => BlockKind::Services,
            BlockContent::Scheduler(_) => BlockKind::Scheduler,
            BlockContent::Unknown { .. } => return None,
        };
        Some(kind)
    }

    /// Serialized type tag
    pub fn type_name(&self) -> &str {
        match self {
            BlockContent::Unknown { type_name, .. } => type_name,
            known => known.kind().map(|kind| kind.as_str()).unwrap_or_default(),
        }
    }

    /// Build canonical content of `kind` from a raw (possibly legacy) content object
    pub fn from_raw(kind: BlockKind, raw: &Map<String, Value>) -> Self {
        match kind {
            BlockKind::Text => BlockContent::Text(TextContent::from_raw(raw)),
            BlockKind::Image => BlockContent::Image(ImageContent::from_raw(raw)),
            BlockKind::Video => BlockContent::Video(VideoContent::from_raw(raw)),
            BlockKind::Audio => BlockContent::Audio(AudioContent::from_raw(raw)),
            BlockKind::Hero => BlockContent::Hero(HeroContent::from_raw(raw)),
            BlockKind::Cta => BlockContent::Cta(CtaContent::from_raw(raw)),
            BlockKind::Quote => BlockContent::Quote(QuoteContent::from_raw(raw)),
            BlockKind::Button => BlockContent::Button(ButtonContent::from_raw(raw)),
            BlockKind::Testimonial => BlockContent::Testimonial(TestimonialContent::from_raw(raw)),
            BlockKind::Header => BlockContent::Header(HeaderContent::from_raw(raw)),
            BlockKind::Footer => BlockContent::Footer(FooterContent::from_raw(raw)),
            BlockKind::Grid => BlockContent::Grid(GridContent::from_raw(raw)),
            BlockKind::Services => BlockContent::Services(ServicesContent::from_raw(raw)),
            BlockKind::Scheduler => BlockContent::Scheduler(SchedulerContent::from_raw(raw)),
        }
    }

    /// Minimally valid content of `kind`
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => BlockContent::Text(TextContent::default_content()),
            BlockKind::Image => BlockContent::Image(ImageContent::default_content()),
            BlockKind::Video => BlockContent::Video(VideoContent::default_content()),
            BlockKind::Audio => BlockContent::Audio(AudioContent::default_content()),
            BlockKind::Hero => BlockContent::Hero(HeroContent::default_content()),
            BlockKind::Cta => BlockContent::Cta(CtaContent::default_content()),
            BlockKind::Quote => BlockContent::Quote(QuoteContent::default_content()),
            BlockKind::Button => BlockContent::Button(ButtonContent::default_content()),
            BlockKind::Testimonial => {
                BlockContent::Testimonial(TestimonialContent::default_content())
            }
            BlockKind::Header => BlockContent::Header(HeaderContent::default_content()),
            BlockKind::Footer => BlockContent::Footer(FooterContent::default_content()),
            BlockKind::Grid => BlockContent::Grid(GridContent::default_content()),
            BlockKind::Services => BlockContent::Services(ServicesContent::default_content()),
            BlockKind::Scheduler => BlockContent::Scheduler(SchedulerContent::default_content()),
        }
    }

    pub fn schema_of(kind: BlockKind) -> Schema {
        match kind {
            BlockKind::Text => TextContent::schema(),
            BlockKind::Image => ImageContent::schema(),
            BlockKind::Video => VideoContent::schema(),
            BlockKind::Audio => AudioContent::schema(),
            BlockKind::Hero => HeroContent::schema(),
            BlockKind::Cta => CtaContent::schema(),
            BlockKind::Quote => QuoteContent::schema(),
            BlockKind::Button => ButtonContent::schema(),
            BlockKind::Testimonial => TestimonialContent::schema(),
            BlockKind::Header => HeaderContent::schema(),
            BlockKind::Footer => FooterContent::schema(),
            BlockKind::Grid => GridContent::schema(),
            BlockKind::Services => ServicesContent::schema(),
            BlockKind::Scheduler => SchedulerContent::schema(),
        }
    }

    /// Schema checks for this content, attributed to `block_id`
    pub fn validate(&self, block_id: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut checker = Checker::new(block_id, &mut errors);

        match self {
            BlockContent::Text(c) => c.check(&mut checker),
            BlockContent::Image(c) => c.check(&mut checker),
            BlockContent::Video(c) => c.check(&mut checker),
            BlockContent::Audio(c) => c.check(&mut checker),
            BlockContent::Hero(c) => c.check(&mut checker),
            BlockContent::Cta(c) => c.check(&mut checker),
            BlockContent::Quote(c) => c.check(&mut checker),
            BlockContent::Button(c) => c.check(&mut checker),
            BlockContent::Testimonial(c) => c.check(&mut checker),
            BlockContent::Header(c) => c.check(&mut checker),
            BlockContent::Footer(c) => c.check(&mut checker),
            BlockContent::Grid(c) => c.check(&mut checker),
            BlockContent::Services(c) => c.check(&mut checker),
            BlockContent::Scheduler(c) => c.check(&mut checker),
            BlockContent::Unknown { type_name, .. } => checker.push(
                ValidationError::new(block_id, format!("Unknown block type {:?}", type_name))
                    .with_code(ErrorCode::UnknownType),
            ),
        }

        errors
    }
}

impl Serialize for BlockContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockContent::Text(c) => c.serialize(serializer),
            BlockContent::Image(c) => c.serialize(serializer),
            BlockContent::Video(c) => c.serialize(serializer),
            BlockContent::Audio(c) => c.serialize(serializer),
            BlockContent::Hero(c) => c.serialize(serializer),
            BlockContent::Cta(c) => c.serialize(serializer),
            BlockContent::Quote(c) => c.serialize(serializer),
            BlockContent::Button(c) => c.serialize(serializer),
            BlockContent::Testimonial(c) => c.serialize(serializer),
            BlockContent::Header(c) => c.serialize(serializer),
            BlockContent::Footer(c) => c.serialize(serializer),
            BlockContent::Grid(c) => c.serialize(serializer),
            BlockContent::Services(c) => c.serialize(serializer),
            BlockContent::Scheduler(c) => c.serialize(serializer),
            BlockContent::Unknown { content, .. } => content.serialize(serializer),
        }
    }
}

/// One typed unit of page content
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub content: BlockContent,
    pub tags: Vec<String>,
    pub meta: BlockMeta,
}

impl Block {
    /// New block with a freshly generated id
    pub fn new(content: BlockContent) -> Self {
        Self::with_id(new_block_id(), content)
    }

    pub fn with_id(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
            tags: Vec::new(),
            meta: BlockMeta::default(),
        }
    }

    pub fn kind(&self) -> Option<BlockKind> {
        self.content.kind()
    }

    pub fn type_name(&self) -> &str {
        self.content.type_name()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.content, BlockContent::Unknown { .. })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless already present
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Nested blocks (grid cells); empty for every other type
    pub fn children(&self) -> &[Block] {
        match &self.content {
            BlockContent::Grid(grid) => &grid.items,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.content {
            BlockContent::Grid(grid) => Some(&mut grid.items),
            _ => None,
        }
    }

    /// Visit this block and every nested block, parents first
    pub fn walk(&self, visit: &mut dyn FnMut(&Block)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn find(&self, id: &str) -> Option<&Block> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Block> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Remove a nested block by id, returning it
    pub fn remove_descendant(&mut self, id: &str) -> Option<Block> {
        let children = self.children_mut()?;
        if let Some(pos) = children.iter().position(|child| child.id == id) {
            return Some(children.remove(pos));
        }
        children
            .iter_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 3 + usize::from(!self.tags.is_empty()) + usize::from(!self.meta.is_empty());
        let mut state = serializer.serialize_struct("Block", len)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", self.type_name())?;
        state.serialize_field("content", &self.content)?;
        if !self.tags.is_empty() {
            state.serialize_field("tags", &self.tags)?;
        }
        if !self.meta.is_empty() {
            state.serialize_field("meta", &self.meta)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        crate::normalize(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let mut block = Block::with_id("blk_1", BlockContent::default_for(BlockKind::Button));
        block.add_tag("ai");
        block.add_tag("ai");

        let value = block.to_value().unwrap();
        assert_eq!(value["id"], "blk_1");
        assert_eq!(value["type"], "button");
        assert_eq!(value["content"]["label"], "Click here");
        assert_eq!(value["tags"], json!(["ai"]));
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_find_and_remove_nested() {
        let child = Block::with_id("child", BlockContent::default_for(BlockKind::Text));
        let mut grid = Block::with_id("grid", BlockContent::default_for(BlockKind::Grid));
        grid.children_mut().unwrap().push(child);

        assert!(grid.find("child").is_some());
        assert_eq!(grid.remove_descendant("child").map(|b| b.id), Some("child".to_string()));
        assert!(grid.children().is_empty());
    }

    #[test]
    fn test_unknown_type_reports_error() {
        let block = Block::with_id(
            "blk_x",
            BlockContent::Unknown {
                type_name: "carousel".to_string(),
                content: json!({ "slides": [] }),
            },
        );

        let errors = block.content.validate(&block.id);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Some(ErrorCode::UnknownType));
        assert_eq!(block.to_value().unwrap()["type"], "carousel");
    }
}
