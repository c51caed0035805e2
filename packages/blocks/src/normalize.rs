//! Raw JSON to canonical [`Block`].
//!
//! Stored blocks come from several generations of editors. A block may keep
//! its fields under `content`, under the legacy `props`, `data` or
//! `settings` wrappers, or flat beside `id` and `type`. When more than one
//! of those is present the most complete wins, ties going to the newer
//! location.

use crate::block::{Block, BlockContent, BlockMeta};
use crate::error::{BlockError, BlockResult};
use crate::kind::BlockKind;
use crate::schema::{coerce_text, filled_leaves};
use pagecraft_common::new_block_id;
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "blockId", "uid"];
const TYPE_KEYS: &[&str] = &["type", "kind", "blockType"];

/// Content wrappers in precedence order
const WRAPPER_KEYS: &[&str] = &["content", "props", "data", "settings"];

const RESERVED_KEYS: &[&str] = &[
    "id", "blockId", "uid", "type", "kind", "blockType", "tags", "meta",
];

/// Parse any stored block shape into its canonical form.
///
/// Fails only when `raw` is not a JSON object.
pub fn normalize(raw: &Value) -> BlockResult<Block> {
    let object = raw
        .as_object()
        .ok_or_else(|| BlockError::NotAnObject(json_type(raw)))?;

    let id = read_id(object).unwrap_or_else(new_block_id);
    let type_name = TYPE_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(coerce_text)
        .map(|name| name.trim().to_string())
        .unwrap_or_default();

    let (source, fields) = select_content(object);
    if source != "content" {
        tracing::trace!("block {}: reading fields from {}", id, source);
    }

    let content = match BlockKind::parse(&type_name) {
        Some(kind) => BlockContent::from_raw(kind, &fields),
        None => BlockContent::Unknown {
            type_name,
            content: Value::Object(fields),
        },
    };

    Ok(Block {
        id,
        content,
        tags: read_tags(object.get("tags")),
        meta: read_meta(object.get("meta")),
    })
}

/// Run a block back through [`normalize`]
pub fn renormalize(block: &Block) -> BlockResult<Block> {
    normalize(&block.to_value()?)
}

fn read_id(object: &Map<String, Value>) -> Option<String> {
    ID_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .filter_map(|value| match value {
            Value::String(id) => Some(id.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .find(|id| !id.is_empty())
}

/// Pick the fullest representation of the block's fields
fn select_content(object: &Map<String, Value>) -> (&'static str, Map<String, Value>) {
    let mut best: Option<(&'static str, usize, Map<String, Value>)> = None;

    for &key in WRAPPER_KEYS {
        if let Some(Value::Object(map)) = object.get(key) {
            let score = map.values().map(filled_leaves).sum::<usize>();
            if best.as_ref().map_or(true, |(_, top, _)| score > *top) {
                best = Some((key, score, map.clone()));
            }
        }
    }

    // Wrapper keys holding a scalar are ordinary flat fields (`content: "Hi"`)
    let flat: Map<String, Value> = object
        .iter()
        .filter(|(key, value)| {
            !RESERVED_KEYS.contains(&key.as_str())
                && !(WRAPPER_KEYS.contains(&key.as_str()) && value.is_object())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let flat_score = flat.values().map(filled_leaves).sum::<usize>();

    match best {
        Some((key, score, map)) if score >= flat_score => (key, map),
        _ => ("flat fields", flat),
    }
}

fn read_tags(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_text).collect(),
        Some(Value::String(list)) => list.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn read_meta(value: Option<&Value>) -> BlockMeta {
    let Some(Value::Object(meta)) = value else {
        return BlockMeta::default();
    };
    let read = |key: &str| {
        meta.get(key)
            .and_then(coerce_text)
            .filter(|text| !text.is_empty())
    };

    BlockMeta {
        prompt: read("prompt"),
        summary: read("summary"),
        comment: read("comment"),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
