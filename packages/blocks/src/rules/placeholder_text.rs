use super::ContentRule;
use crate::block::{Block, BlockContent};
use crate::validate::{ErrorCode, ValidationError};
use serde_json::Value;

const MARKERS: &[&str] = &["lorem ipsum", "dolor sit amet"];

/// Flags filler copy left behind by generated or starter content
pub struct PlaceholderTextRule;

impl ContentRule for PlaceholderTextRule {
    fn name(&self) -> &'static str {
        "placeholder-text"
    }

    fn description(&self) -> &'static str {
        "Disallow lorem ipsum placeholder copy"
    }

    fn check(&self, block: &Block) -> Vec<ValidationError> {
        // Grid cells are checked as blocks of their own
        if matches!(block.content, BlockContent::Grid(_) | BlockContent::Unknown { .. }) {
            return Vec::new();
        }
        let Ok(content) = serde_json::to_value(&block.content) else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        scan(&content, String::new(), &mut |path, text| {
            errors.push(
                ValidationError::new(&block.id, format!("Placeholder text left in {}: {:?}", path, text))
                    .with_field(path)
                    .with_code(ErrorCode::Placeholder),
            );
        });
        errors
    }
}

fn scan(value: &Value, path: String, found: &mut dyn FnMut(String, &str)) {
    let join = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", path, key)
        }
    };

    match value {
        Value::String(text) => {
            let lower = text.to_lowercase();
            if MARKERS.iter().any(|marker| lower.contains(marker)) {
                found(path.clone(), text);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                scan(item, join(&index.to_string()), found);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                scan(item, join(key), found);
            }
        }
        _ => {}
    }
}
