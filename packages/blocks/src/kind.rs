//! Block type tags.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Every block variant the editor knows how to normalize and validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    Text,
    Image,
    Video,
    Audio,
    Hero,
    Cta,
    Quote,
    Button,
    Testimonial,
    Header,
    Footer,
    Grid,
    Services,
    Scheduler,
}

impl BlockKind {
    pub const ALL: [BlockKind; 14] = [
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Audio,
        BlockKind::Hero,
        BlockKind::Cta,
        BlockKind::Quote,
        BlockKind::Button,
        BlockKind::Testimonial,
        BlockKind::Header,
        BlockKind::Footer,
        BlockKind::Grid,
        BlockKind::Services,
        BlockKind::Scheduler,
    ];

    /// Canonical serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Audio => "audio",
            BlockKind::Hero => "hero",
            BlockKind::Cta => "cta",
            BlockKind::Quote => "quote",
            BlockKind::Button => "button",
            BlockKind::Testimonial => "testimonial",
            BlockKind::Header => "header",
            BlockKind::Footer => "footer",
            BlockKind::Grid => "grid",
            BlockKind::Services => "services",
            BlockKind::Scheduler => "scheduler",
        }
    }

    /// Parse a type tag, accepting the legacy spellings stored by older editors.
    ///
    /// Matching ignores case, hyphens, underscores and spaces.
    pub fn parse(tag: &str) -> Option<Self> {
        let key: String = tag
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let kind = match key.as_str() {
            "text" | "paragraph" | "richtext" => BlockKind::Text,
            "image" | "img" | "photo" => BlockKind::Image,
            "video" | "embedvideo" => BlockKind::Video,
            "audio" | "podcast" => BlockKind::Audio,
            "hero" | "banner" => BlockKind::Hero,
            "cta" | "calltoaction" => BlockKind::Cta,
            "quote" | "blockquote" => BlockKind::Quote,
            "button" => BlockKind::Button,
            "testimonial" | "review" => BlockKind::Testimonial,
            "header" | "navbar" | "nav" => BlockKind::Header,
            "footer" => BlockKind::Footer,
            "grid" | "gridblocks" | "columns" => BlockKind::Grid,
            "services" | "serviceslist" | "servicelist" => BlockKind::Services,
            "scheduler" | "booking" | "calendar" => BlockKind::Scheduler,
            _ => return None,
        };

        Some(kind)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown block type: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::parse(s).ok_or_else(|| UnknownKind(s.to_string()))
    }
}

impl Serialize for BlockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
