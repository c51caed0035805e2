//! Apply validator suggestions.

use crate::block::{Block, BlockContent};
use crate::validate::{validate, ValidationError};
use serde_json::Value;

pub const AUTOFIXED_TAG: &str = "autofixed";

#[derive(Debug, Clone)]
pub struct AutofixOutcome {
    pub block: Block,

    /// Errors whose suggestion was written, nested blocks included
    pub fixed: Vec<ValidationError>,
}

impl AutofixOutcome {
    pub fn changed(&self) -> bool {
        !self.fixed.is_empty()
    }
}

/// Write every suggested default into `block`.
///
/// Grid cells are fixed first, each tagged on its own. Errors without a
/// suggestion are left for the user.
pub fn autofix(block: &Block) -> AutofixOutcome {
    let mut block = block.clone();
    let mut fixed = Vec::new();

    if let Some(children) = block.children_mut() {
        for child in children.iter_mut() {
            let outcome = autofix(child);
            *child = outcome.block;
            fixed.extend(outcome.fixed);
        }
    }

    let own: Vec<ValidationError> = validate(&block)
        .into_iter()
        .filter(|error| error.block_id == block.id && error.is_fixable())
        .collect();
    if own.is_empty() {
        return AutofixOutcome { block, fixed };
    }

    let Some(kind) = block.kind() else {
        return AutofixOutcome { block, fixed };
    };
    let mut content = match serde_json::to_value(&block.content) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!("block {}: cannot serialize content for autofix: {}", block.id, err);
            return AutofixOutcome { block, fixed };
        }
    };

    let mut applied = Vec::new();
    for error in own {
        let written = match (&error.field, &error.suggestion) {
            (Some(field), Some(suggestion)) => set_path(&mut content, field, suggestion.clone()),
            _ => false,
        };
        if written {
            applied.push(error);
        } else {
            tracing::debug!("block {}: no slot for {:?}", block.id, error.field);
        }
    }

    if let Value::Object(fields) = &content {
        block.content = BlockContent::from_raw(kind, fields);
    }
    if !applied.is_empty() {
        tracing::debug!("block {}: autofixed {} fields", block.id, applied.len());
        block.add_tag(AUTOFIXED_TAG);
        fixed.extend(applied);
    }

    AutofixOutcome { block, fixed }
}

/// Set a dotted path (`links.0.label`) inside `target`, creating the last key
fn set_path(target: &mut Value, path: &str, value: Value) -> bool {
    let mut segments = path.split('.').peekable();
    let mut current = target;

    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        current = match current {
            Value::Object(map) => {
                if last {
                    map.insert(segment.to_string(), value);
                    return true;
                }
                match map.get_mut(segment) {
                    Some(next) => next,
                    None => return false,
                }
            }
            Value::Array(items) => {
                let Some(slot) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i))
                else {
                    return false;
                };
                if last {
                    *slot = value;
                    return true;
                }
                slot
            }
            _ => return false,
        };
    }

    false
}
