//! Stored JSON shape of a template.
//!
//! [`Template::to_stored`] writes the canonical model out together with
//! every mirror older readers depend on (`data.site.pages`, the legacy
//! `data.meta` identity keys, the identity columns). [`Template::from_stored`]
//! reads any generation of that shape back.

use crate::identity::{PartialIdentity, META_IDENTITY_KEYS};
use crate::merge::{MergeError, TemplatePatch};
use crate::template::{Page, Template};
use pagecraft_blocks::Block;
use pagecraft_common::slugify;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const IDENTITY_COLUMNS: &[&str] = &["name", "industry", "industryLabel", "email", "phone", "address"];
const MODEL_COLUMNS: &[&str] = &["id", "revision", "slug", "data"];
const MODEL_DATA_KEYS: &[&str] = &["pages", "site", "meta", "identity", "headerBlock", "footerBlock"];

impl Template {
    pub fn to_stored(&self) -> serde_json::Result<Value> {
        let pages = serde_json::to_value(&self.pages)?;

        let mut data = self.extra.clone();
        let mut site = match data.remove("site") {
            Some(Value::Object(site)) => site,
            _ => Map::new(),
        };
        site.insert("pages".into(), pages.clone());
        data.insert("pages".into(), pages);
        data.insert("site".into(), Value::Object(site));

        let mut meta = self.meta.clone();
        self.identity.write_meta(&mut meta);
        data.insert("meta".into(), Value::Object(meta));
        data.insert("identity".into(), self.identity.snapshot());

        if let Some(header) = &self.header_block {
            data.insert("headerBlock".into(), serde_json::to_value(header)?);
        }
        if let Some(footer) = &self.footer_block {
            data.insert("footerBlock".into(), serde_json::to_value(footer)?);
        }

        let mut stored = self.columns.clone();
        stored.insert("id".into(), Value::from(self.id.clone()));
        stored.insert("revision".into(), Value::from(self.revision));
        self.identity.write_columns(&mut stored);
        stored.insert("slug".into(), Value::from(self.slug.clone()));
        stored.insert("data".into(), Value::Object(data));

        Ok(Value::Object(stored))
    }

    pub fn from_stored(stored: &Value) -> Result<Template, MergeError> {
        let object = stored
            .as_object()
            .ok_or_else(|| MergeError::Malformed("template must be a JSON object".into()))?;

        let id = match object.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(MergeError::Malformed("template has no id".into())),
        };
        let revision = match object.get("revision") {
            None | Some(Value::Null) => 0,
            Some(value) => value
                .as_u64()
                .ok_or_else(|| MergeError::Malformed(format!("invalid revision {}", value)))?,
        };

        let empty = Map::new();
        let data = match object.get("data") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(data)) => data,
            Some(_) => return Err(MergeError::Malformed("data must be an object".into())),
        };

        let site = data.get("site").and_then(Value::as_object);
        let root_pages = page_list(data.get("pages"), "data.pages")?;
        let nested_pages = page_list(site.and_then(|site| site.get("pages")), "data.site.pages")?;
        let mut pages: Vec<Page> = match root_pages.or(nested_pages) {
            Some(pages) => serde_json::from_value(pages.clone())?,
            None => Vec::new(),
        };
        for page in &mut pages {
            let source = if page.slug.trim().is_empty() { &page.title } else { &page.slug };
            page.slug = slugify(source);
        }

        let identity = PartialIdentity::from_columns(object)
            .or(PartialIdentity::from_snapshot(data.get("identity")))
            .or(PartialIdentity::from_meta(data.get("meta")))
            .resolve(&Default::default());

        let mut meta = data
            .get("meta")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        for key in META_IDENTITY_KEYS {
            meta.remove(*key);
        }

        let mut extra: Map<String, Value> = data
            .iter()
            .filter(|(key, _)| !MODEL_DATA_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Some(site) = site {
            let mut rest = site.clone();
            rest.remove("pages");
            if !rest.is_empty() {
                extra.insert("site".into(), Value::Object(rest));
            }
        }

        let columns = object
            .iter()
            .filter(|(key, _)| {
                !MODEL_COLUMNS.contains(&key.as_str()) && !IDENTITY_COLUMNS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Template {
            id,
            revision,
            slug: object
                .get("slug")
                .and_then(Value::as_str)
                .map(slugify)
                .unwrap_or_default(),
            identity,
            pages,
            header_block: read_block(data.get("headerBlock"))?,
            footer_block: read_block(data.get("footerBlock"))?,
            meta,
            columns,
            extra,
        })
    }

    /// Full-document patch: every column and the whole `data` body
    pub fn to_patch(&self) -> serde_json::Result<TemplatePatch> {
        let Value::Object(mut columns) = self.to_stored()? else {
            return Ok(TemplatePatch::default());
        };
        columns.remove("revision");
        let document_body = match columns.remove("data") {
            Some(Value::Object(data)) => Some(data),
            _ => None,
        };

        Ok(TemplatePatch {
            columns,
            document_body,
        })
    }
}

fn page_list<'a>(value: Option<&'a Value>, location: &str) -> Result<Option<&'a Value>, MergeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(pages @ Value::Array(_)) => Ok(Some(pages)),
        Some(_) => Err(MergeError::Malformed(format!("{} must be an array", location))),
    }
}

fn read_block(value: Option<&Value>) -> Result<Option<Block>, MergeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(pagecraft_blocks::normalize(value)?)),
    }
}

/// True when a stored document's two page lists disagree
pub fn pages_mirror_mismatch(stored: &Value) -> bool {
    let data = stored.get("data");
    let root = data.and_then(|data| data.get("pages"));
    let nested = data
        .and_then(|data| data.get("site"))
        .and_then(|site| site.get("pages"));

    matches!((root, nested), (Some(root), Some(nested)) if root != nested)
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_stored()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = Value::deserialize(deserializer)?;
        Template::from_stored(&stored).map_err(serde::de::Error::custom)
    }
}
