//! Business identity: name, industry and contact details.
//!
//! The same values live in three stored locations (top-level columns,
//! `data.identity` and the legacy `data.meta` keys). [`PartialIdentity`]
//! reads any one of them; projection writes all three.

use crate::merge::TemplatePatch;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const OTHER_INDUSTRY: &str = "other";

const CATALOG: &[(&str, &str)] = &[
    ("plumbing", "Plumbing"),
    ("landscaping", "Landscaping"),
    ("salon", "Salon & Beauty"),
    ("restaurant", "Restaurant"),
    ("fitness", "Fitness"),
    ("photography", "Photography"),
    ("consulting", "Consulting"),
    ("cleaning", "Cleaning"),
    ("construction", "Construction"),
    ("retail", "Retail"),
    (OTHER_INDUSTRY, "Other"),
];

/// Canonical industry key with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub key: String,
    pub label: String,
}

impl Industry {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    pub fn is_other(&self) -> bool {
        self.key == OTHER_INDUSTRY
    }
}

pub fn catalog() -> impl Iterator<Item = Industry> {
    CATALOG.iter().map(|(key, label)| Industry::new(*key, *label))
}

/// Catalog entry whose key or label matches `text`, ignoring case
///
/// `other` itself never matches; it is not a concrete industry.
pub fn lookup_industry(text: &str) -> Option<Industry> {
    let text = text.trim();
    CATALOG
        .iter()
        .filter(|(key, _)| *key != OTHER_INDUSTRY)
        .find(|(key, label)| key.eq_ignore_ascii_case(text) || label.eq_ignore_ascii_case(text))
        .map(|(key, label)| Industry::new(*key, *label))
}

/// Resolve a picker selection plus optional free text to a key/label pair
pub fn resolve_industry(selection: &str, free_text: Option<&str>) -> Industry {
    let selection = selection.trim();
    let free_text = free_text.map(str::trim).filter(|text| !text.is_empty());

    if selection.eq_ignore_ascii_case(OTHER_INDUSTRY) || selection.is_empty() {
        return match free_text {
            Some(text) => lookup_industry(text).unwrap_or_else(|| Industry::new(OTHER_INDUSTRY, text)),
            None => Industry::new(OTHER_INDUSTRY, "Other"),
        };
    }

    lookup_industry(selection).unwrap_or_else(|| Industry::new(OTHER_INDUSTRY, selection))
}

/// Complete a stored key/label pair
fn complete_industry(key: Option<&str>, label: Option<&str>) -> Option<Industry> {
    let key = key.map(str::trim).filter(|key| !key.is_empty());
    let label = label.map(str::trim).filter(|label| !label.is_empty());

    match (key, label) {
        (None, None) => None,
        (Some(key), label) if key.eq_ignore_ascii_case(OTHER_INDUSTRY) => {
            Some(resolve_industry(OTHER_INDUSTRY, label))
        }
        (Some(key), Some(label)) => Some(Industry::new(key, label)),
        (Some(key), None) => Some(lookup_industry(key).unwrap_or_else(|| Industry::new(OTHER_INDUSTRY, key))),
        (None, Some(label)) => Some(resolve_industry(label, None)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub industry: Option<Industry>,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Identity {
    /// `data.identity` snapshot
    pub fn snapshot(&self) -> Value {
        json!({
            "name": self.name,
            "industry": self.industry,
            "contact": {
                "email": self.email,
                "phone": self.phone,
                "address": self.address,
            },
        })
    }

    /// Top-level column values
    pub fn write_columns(&self, columns: &mut Map<String, Value>) {
        let (key, label) = self.industry_pair();
        columns.insert("name".into(), json!(self.name));
        columns.insert("industry".into(), json!(key));
        columns.insert("industryLabel".into(), json!(label));
        columns.insert("email".into(), json!(self.email));
        columns.insert("phone".into(), json!(self.phone));
        columns.insert("address".into(), json!(self.address));
    }

    /// Legacy `data.meta` keys; `industryOther` is written only for `other`
    pub fn write_meta(&self, meta: &mut Map<String, Value>) {
        let (key, label) = self.industry_pair();
        meta.insert("businessName".into(), json!(self.name));
        meta.insert("industry".into(), json!(key));
        meta.insert("industryLabel".into(), json!(label));
        match &self.industry {
            Some(industry) if industry.is_other() => {
                meta.insert("industryOther".into(), json!(industry.label));
            }
            _ => {
                meta.remove("industryOther");
            }
        }
        meta.insert("contactEmail".into(), json!(self.email));
        meta.insert("contactPhone".into(), json!(self.phone));
        meta.insert("address".into(), json!(self.address));
    }

    fn industry_pair(&self) -> (&str, &str) {
        self.industry
            .as_ref()
            .map(|industry| (industry.key.as_str(), industry.label.as_str()))
            .unwrap_or(("", ""))
    }
}

/// Legacy identity keys inside `data.meta`
pub const META_IDENTITY_KEYS: &[&str] = &[
    "businessName",
    "industry",
    "industryLabel",
    "industryOther",
    "contactEmail",
    "contactPhone",
    "address",
];

/// Identity values one stored location specified
///
/// The industry travels as a pair: whichever location names a key or a
/// label supplies both, so a key from one location is never matched
/// with a label from another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialIdentity {
    pub name: Option<String>,
    pub industry: Option<Option<Industry>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl PartialIdentity {
    pub fn from_columns(columns: &Map<String, Value>) -> Self {
        Self {
            name: read(columns, "name"),
            industry: read_pair(read(columns, "industry"), read(columns, "industryLabel")),
            email: read(columns, "email"),
            phone: read(columns, "phone"),
            address: read(columns, "address"),
        }
    }

    pub fn from_snapshot(identity: Option<&Value>) -> Self {
        let Some(Value::Object(identity)) = identity else {
            return Self::default();
        };

        let industry = match identity.get("industry") {
            Some(Value::Object(pair)) => read_pair(read(pair, "key"), read(pair, "label")),
            Some(Value::String(key)) => read_pair(Some(key.clone()), None),
            Some(Value::Null) => Some(None),
            _ => None,
        };
        let contact = identity.get("contact").and_then(Value::as_object);
        let contact_field = |key: &str| contact.and_then(|contact| read(contact, key));

        Self {
            name: read(identity, "name"),
            industry,
            email: contact_field("email"),
            phone: contact_field("phone"),
            address: contact_field("address"),
        }
    }

    pub fn from_meta(meta: Option<&Value>) -> Self {
        let Some(Value::Object(meta)) = meta else {
            return Self::default();
        };

        let key = read(meta, "industry");
        let is_other = key
            .as_deref()
            .map_or(false, |key| key.eq_ignore_ascii_case(OTHER_INDUSTRY));
        let label = match read(meta, "industryOther") {
            Some(other) if is_other && !other.trim().is_empty() => Some(other),
            _ => read(meta, "industryLabel"),
        };

        Self {
            name: read(meta, "businessName"),
            industry: read_pair(key, label),
            email: read(meta, "contactEmail"),
            phone: read(meta, "contactPhone"),
            address: read(meta, "address"),
        }
    }

    /// Field by field, keep `self` and fill gaps from `other`
    pub fn or(self, other: Self) -> Self {
        Self {
            name: self.name.or(other.name),
            industry: self.industry.or(other.industry),
            email: self.email.or(other.email),
            phone: self.phone.or(other.phone),
            address: self.address.or(other.address),
        }
    }

    pub fn resolve(self, base: &Identity) -> Identity {
        Identity {
            name: self.name.unwrap_or_else(|| base.name.clone()),
            industry: self.industry.unwrap_or_else(|| base.industry.clone()),
            email: self.email.unwrap_or_else(|| base.email.clone()),
            phone: self.phone.unwrap_or_else(|| base.phone.clone()),
            address: self.address.unwrap_or_else(|| base.address.clone()),
        }
    }
}

/// A string field; `null` counts as explicitly cleared
fn read(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Null => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_pair(key: Option<String>, label: Option<String>) -> Option<Option<Industry>> {
    if key.is_none() && label.is_none() {
        return None;
    }
    Some(complete_industry(key.as_deref(), label.as_deref()))
}

/// Flat identity fields as edited in a settings form
///
/// `None` keeps the template's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Picker selection: a catalog key or label, `other`, or free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl IdentityDraft {
    /// Apply the draft over `base`
    pub fn resolve(&self, base: &Identity) -> Identity {
        let text = |field: &Option<String>, current: &str| {
            field
                .as_deref()
                .map(str::trim)
                .unwrap_or(current)
                .to_string()
        };

        let industry = match (&self.industry, &self.industry_other) {
            (Some(selection), other) => {
                if selection.trim().is_empty() && other.as_deref().map_or(true, |o| o.trim().is_empty()) {
                    None
                } else {
                    Some(resolve_industry(selection, other.as_deref()))
                }
            }
            // Free text alone only edits an `other` industry
            (None, Some(other)) if base.industry.as_ref().map_or(false, Industry::is_other) => {
                Some(resolve_industry(OTHER_INDUSTRY, Some(other)))
            }
            (None, _) => base.industry.clone(),
        };

        Identity {
            name: text(&self.name, &base.name),
            industry,
            email: text(&self.email, &base.email),
            phone: text(&self.phone, &base.phone),
            address: text(&self.address, &base.address),
        }
    }
}

/// One patch that writes the drafted identity to every stored location
pub fn build_identity_patch(draft: &IdentityDraft, template: &Template) -> TemplatePatch {
    let identity = draft.resolve(&template.identity);

    let mut columns = Map::new();
    identity.write_columns(&mut columns);

    let mut meta = Map::new();
    identity.write_meta(&mut meta);
    if !meta.contains_key("industryOther") {
        // Merge-patch null removes a stale value
        meta.insert("industryOther".into(), Value::Null);
    }

    let mut body = Map::new();
    body.insert("identity".into(), identity.snapshot());
    body.insert("meta".into(), Value::Object(meta));

    TemplatePatch {
        columns,
        document_body: Some(body),
    }
}
