//! Patch merging and mirror reconciliation.

use crate::identity::PartialIdentity;
use crate::template::Template;
use pagecraft_blocks::BlockError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Malformed template: {0}")]
    Malformed(String),

    #[error("Patch targets template {found}, expected {expected}")]
    IdMismatch { expected: String, found: String },

    #[error("Invalid block: {0}")]
    Block(#[from] BlockError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Partial update in stored shape
///
/// Top-level fields overwrite; the document body is merged key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePatch {
    #[serde(flatten)]
    pub columns: Map<String, Value>,

    #[serde(
        rename = "documentBody",
        alias = "data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_body: Option<Map<String, Value>>,
}

impl TemplatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.document_body
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.document_body.as_ref().map_or(true, Map::is_empty)
    }

    /// Pages the patch specified, root location first
    pub fn pages(&self) -> Option<&Value> {
        let body = self.document_body.as_ref()?;
        match body.get("pages") {
            Some(pages) => Some(pages),
            None => body
                .get("site")
                .and_then(|site| site.get("pages")),
        }
    }
}

/// JSON merge patch: objects merge recursively, `null` removes, anything else replaces
pub fn merge_value(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_value(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Apply `patch` to `current`, re-establishing every mirror.
///
/// Nothing is applied unless the merged document parses back.
pub fn merge_template(current: &Template, patch: &TemplatePatch) -> Result<Template, MergeError> {
    if let Some(body) = &patch.document_body {
        let nested = body.get("site").and_then(|site| site.get("pages"));
        for (location, pages) in [("data.pages", body.get("pages")), ("data.site.pages", nested)] {
            if matches!(pages, Some(pages) if !pages.is_null() && !pages.is_array()) {
                return Err(MergeError::Malformed(format!("{} must be an array", location)));
            }
        }
    }

    let mut stored = current.to_stored()?;
    let Value::Object(object) = &mut stored else {
        return Err(MergeError::Malformed("template did not project to an object".into()));
    };

    for (key, value) in &patch.columns {
        match key.as_str() {
            "id" => {
                let found = match value {
                    Value::String(id) => id.clone(),
                    other => other.to_string(),
                };
                if found != current.id {
                    return Err(MergeError::IdMismatch {
                        expected: current.id.clone(),
                        found,
                    });
                }
            }
            "revision" => {}
            _ if value.is_null() => {
                object.remove(key);
            }
            _ => {
                object.insert(key.clone(), value.clone());
            }
        }
    }

    let data = object
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(body) = &patch.document_body {
        merge_value(data, &Value::Object(body.clone()));
    }

    // One page list, written to both locations
    let pages = match patch.pages() {
        Some(Value::Null) => Value::Array(Vec::new()),
        Some(pages) => pages.clone(),
        None => serde_json::to_value(&current.pages)?,
    };
    if let Value::Object(data) = data {
        data.insert("pages".into(), pages.clone());
        let site = data
            .entry("site")
            .or_insert_with(|| Value::Object(Map::new()));
        if !site.is_object() {
            *site = Value::Object(Map::new());
        }
        if let Value::Object(site) = site {
            site.insert("pages".into(), pages);
        }
    }

    let body = patch.document_body.as_ref();
    let identity = PartialIdentity::from_columns(&patch.columns)
        .or(PartialIdentity::from_snapshot(body.and_then(|b| b.get("identity"))))
        .or(PartialIdentity::from_meta(body.and_then(|b| b.get("meta"))))
        .resolve(&current.identity);

    let mut merged = Template::from_stored(&stored)?;
    merged.identity = identity;
    merged.revision = current.revision;

    tracing::trace!("merged patch into template {}", current.id);
    Ok(merged)
}
