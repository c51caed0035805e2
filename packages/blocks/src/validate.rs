//! Block validation.
//!
//! Validation never mutates a block. Each variant reports field-level
//! errors through a [`Checker`]; errors that have a safe default carry it
//! as `suggestion` so [`crate::autofix`] can apply it.

use crate::block::Block;
use crate::rules::{ContentRule, PlaceholderTextRule};
use crate::schema::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Required,
    InvalidUrl,
    OutOfRange,
    InvalidChoice,
    UnknownType,
    Placeholder,
}

/// A field-level problem with one block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub block_id: String,

    /// Dotted path into the block content, e.g. `links.0.label`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,

    /// Safe default the autofixer may write into `field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Value>,
}

impl ValidationError {
    pub fn new(block_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            field: None,
            message: message.into(),
            code: None,
            suggestion: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_suggestion(mut self, suggestion: Value) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.field.is_some() && self.suggestion.is_some()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}: {}", self.block_id, field, self.message),
            None => write!(f, "[{}] {}", self.block_id, self.message),
        }
    }
}

/// Collects errors for one block, tracking the path into nested lists
pub struct Checker<'a> {
    block_id: &'a str,
    prefix: String,
    errors: &'a mut Vec<ValidationError>,
}

impl<'a> Checker<'a> {
    pub fn new(block_id: &'a str, errors: &'a mut Vec<ValidationError>) -> Self {
        Self {
            block_id,
            prefix: String::new(),
            errors,
        }
    }

    /// Checker for an element of a nested list, e.g. `links.2`
    pub fn nested(&mut self, list: &str, index: usize) -> Checker<'_> {
        Checker {
            block_id: self.block_id,
            prefix: format!("{}{}.{}.", self.prefix, list, index),
            errors: &mut *self.errors,
        }
    }

    pub fn path(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field)
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    fn error(&self, field: &Field, code: ErrorCode, message: String) -> ValidationError {
        ValidationError::new(self.block_id, message)
            .with_field(self.path(field.name))
            .with_code(code)
    }

    pub fn required(&mut self, field: &Field, value: &str) {
        if !value.trim().is_empty() {
            return;
        }

        let mut error = self.error(
            field,
            ErrorCode::Required,
            format!("{} is required", field.name),
        );
        if let Some(suggestion) = field.suggestion() {
            error = error.with_suggestion(suggestion);
        }
        self.push(error);
    }

    /// Links accept absolute http(s), site-relative paths, anchors, mailto and tel
    pub fn link(&mut self, field: &Field, value: &str) {
        if value.is_empty() || is_link(value) {
            return;
        }
        let error = self.error(
            field,
            ErrorCode::InvalidUrl,
            format!("{} is not a valid link: {:?}", field.name, value),
        );
        self.push(error);
    }

    /// Media URLs accept absolute http(s), site-relative paths and data URIs
    pub fn media(&mut self, field: &Field, value: &str) {
        if value.is_empty() || is_media_url(value) {
            return;
        }
        let error = self.error(
            field,
            ErrorCode::InvalidUrl,
            format!("{} is not a valid media URL: {:?}", field.name, value),
        );
        self.push(error);
    }

    pub fn range(&mut self, field: &Field, value: u32, min: u32, max: u32) {
        if (min..=max).contains(&value) {
            return;
        }
        let mut error = self.error(
            field,
            ErrorCode::OutOfRange,
            format!("{} must be between {} and {}, got {}", field.name, min, max, value),
        );
        if let Some(suggestion) = field.suggestion() {
            error = error.with_suggestion(suggestion);
        }
        self.push(error);
    }

    pub fn choice(&mut self, field: &Field, value: &str, allowed: &[&str]) {
        if allowed.contains(&value) {
            return;
        }
        let mut error = self.error(
            field,
            ErrorCode::InvalidChoice,
            format!("{} must be one of {}, got {:?}", field.name, allowed.join(", "), value),
        );
        if let Some(suggestion) = field.suggestion() {
            error = error.with_suggestion(suggestion);
        }
        self.push(error);
    }
}

pub fn is_link(value: &str) -> bool {
    let value = value.trim();
    value.starts_with('#')
        || (value.starts_with('/') && !value.starts_with("//"))
        || has_http_scheme(value)
        || value.starts_with("mailto:")
        || value.starts_with("tel:")
}

pub fn is_media_url(value: &str) -> bool {
    let value = value.trim();
    (value.starts_with('/') && !value.starts_with("//"))
        || has_http_scheme(value)
        || value.starts_with("data:")
}

fn has_http_scheme(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

/// Run the schema checks of `block` (and of any nested blocks)
pub fn validate(block: &Block) -> Vec<ValidationError> {
    block.content.validate(&block.id)
}

/// Schema validation plus a set of content rules
pub struct Validator {
    rules: Vec<Box<dyn ContentRule>>,
}

impl Validator {
    /// Validator with the built-in content rules
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(PlaceholderTextRule)],
        }
    }

    /// Schema checks only
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Box<dyn ContentRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Box<dyn ContentRule>] {
        &self.rules
    }

    pub fn validate(&self, block: &Block) -> Vec<ValidationError> {
        let mut errors = validate(block);
        if !self.rules.is_empty() {
            block.walk(&mut |nested| {
                for rule in &self.rules {
                    errors.extend(rule.check(nested));
                }
            });
        }
        errors
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_shapes() {
        assert!(is_link("#contact"));
        assert!(is_link("/about"));
        assert!(is_link("https://example.com"));
        assert!(is_link("mailto:hi@example.com"));
        assert!(is_link("tel:+15550100"));
        assert!(!is_link("//cdn.example.com"));
        assert!(!is_link("https://"));
        assert!(!is_link("about us"));
    }

    #[test]
    fn test_media_shapes() {
        assert!(is_media_url("https://cdn.example.com/a.png"));
        assert!(is_media_url("/uploads/a.png"));
        assert!(is_media_url("data:image/png;base64,AAAA"));
        assert!(!is_media_url("#top"));
    }

    #[test]
    fn test_checker_prefixes_nested_paths() {
        let label = Field::text("label").required().fallback("Link");
        let mut errors = Vec::new();
        {
            let mut checker = Checker::new("blk_1", &mut errors);
            let mut nested = checker.nested("links", 2);
            nested.required(&label, "  ");
        }

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("links.2.label"));
        assert_eq!(errors[0].code, Some(ErrorCode::Required));
        assert!(errors[0].is_fixable());
    }
}
