//! Per-variant content schemas.
//!
//! A [`Field`] names one content key together with the legacy aliases older
//! editors stored it under. The normalizer reads through the aliases, the
//! validator reports against the canonical name, and the autofixer writes
//! the field's fallback.

use crate::kind::BlockKind;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Url,
    Number,
    Flag,
    Choice,
    Links,
    List,
    Blocks,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: &'static str,
    #[serde(skip_serializing_if = "no_aliases")]
    pub aliases: &'static [&'static str],
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<&'static str>,
}

fn no_aliases(aliases: &&'static [&'static str]) -> bool {
    aliases.is_empty()
}

impl Field {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            aliases: &[],
            ty,
            required: false,
            fallback: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub const fn url(name: &'static str) -> Self {
        Self::new(name, FieldType::Url)
    }

    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Field { aliases, ..self }
    }

    pub const fn required(self) -> Self {
        Field {
            required: true,
            ..self
        }
    }

    pub const fn fallback(self, value: &'static str) -> Self {
        Field {
            fallback: Some(value),
            ..self
        }
    }

    /// Look the field up under its canonical name, then its aliases.
    ///
    /// A non-empty value wins over an empty one regardless of which key holds it.
    pub fn lookup<'a>(&self, raw: &'a Map<String, Value>) -> Option<&'a Value> {
        let mut present = std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .filter_map(|key| raw.get(key))
            .filter(|value| !value.is_null())
            .peekable();

        let first = present.peek().copied();
        present.find(|value| is_meaningful(value)).or(first)
    }

    pub fn read_text(&self, raw: &Map<String, Value>) -> String {
        self.lookup(raw).and_then(coerce_text).unwrap_or_default()
    }

    pub fn read_opt_text(&self, raw: &Map<String, Value>) -> Option<String> {
        self.lookup(raw)
            .and_then(coerce_text)
            .filter(|text| !text.is_empty())
    }

    pub fn read_flag(&self, raw: &Map<String, Value>, default: bool) -> bool {
        match self.lookup(raw) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(default),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => true,
                "false" | "no" | "0" | "off" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn read_opt_number(&self, raw: &Map<String, Value>) -> Option<u32> {
        match self.lookup(raw)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
                .map(|n| n.min(u32::MAX as u64) as u32),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn read_number(&self, raw: &Map<String, Value>, default: u32) -> u32 {
        self.read_opt_number(raw).unwrap_or(default)
    }

    pub fn read_list<'a>(&self, raw: &'a Map<String, Value>) -> &'a [Value] {
        self.lookup(raw)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The autofix value in the JSON type this field serializes as
    pub fn suggestion(&self) -> Option<Value> {
        let fallback = self.fallback?;
        let value = match self.ty {
            FieldType::Number => fallback
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(fallback)),
            FieldType::Flag => Value::Bool(fallback == "true"),
            _ => Value::from(fallback),
        };
        Some(value)
    }
}

/// Field layout of one block variant
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Schema {
    pub kind: BlockKind,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.required)
    }
}

pub(crate) fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Number of non-empty leaf values below `value`
pub(crate) fn filled_leaves(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.iter().map(filled_leaves).sum(),
        Value::Object(map) => map.values().map(filled_leaves).sum(),
        leaf if is_meaningful(leaf) => 1,
        _ => 0,
    }
}
