//! Publish gate.
//!
//! Hard issues are structural: a document with them cannot be rendered or
//! addressed reliably. Field-level validation errors are soft and only
//! reported.

use crate::projection::pages_mirror_mismatch;
use crate::template::Template;
use pagecraft_blocks::{Block, ErrorCode, ValidationError, Validator};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum GateIssue {
    Malformed { message: String },
    #[serde(rename_all = "camelCase")]
    UnknownBlockType { block_id: String, type_name: String },
    #[serde(rename_all = "camelCase")]
    DuplicateBlockId { block_id: String },
    DuplicatePageSlug { slug: String },
    #[serde(rename_all = "camelCase")]
    EmptyPageSlug { page_id: String },
    MirrorMismatch,
}

impl fmt::Display for GateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateIssue::Malformed { message } => write!(f, "malformed document: {}", message),
            GateIssue::UnknownBlockType { block_id, type_name } => {
                write!(f, "block {} has unknown type {:?}", block_id, type_name)
            }
            GateIssue::DuplicateBlockId { block_id } => write!(f, "duplicate block id {}", block_id),
            GateIssue::DuplicatePageSlug { slug } => write!(f, "duplicate page slug {}", slug),
            GateIssue::EmptyPageSlug { page_id } => write!(f, "page {} has no slug", page_id),
            GateIssue::MirrorMismatch => f.write_str("data.pages and data.site.pages differ"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GateReport {
    pub hard: Vec<GateIssue>,
    pub soft: Vec<ValidationError>,
}

impl GateReport {
    pub fn is_blocking(&self) -> bool {
        !self.hard.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.hard.is_empty() && self.soft.is_empty()
    }
}

pub fn check_template(template: &Template, validator: &Validator) -> GateReport {
    let mut report = GateReport::default();

    let mut ids = HashSet::new();
    template.walk_blocks(&mut |block: &Block| {
        if block.is_unknown() {
            report.hard.push(GateIssue::UnknownBlockType {
                block_id: block.id.clone(),
                type_name: block.type_name().to_string(),
            });
        }
        if !ids.insert(block.id.clone()) {
            report.hard.push(GateIssue::DuplicateBlockId {
                block_id: block.id.clone(),
            });
        }
    });

    let mut slugs = HashSet::new();
    for page in &template.pages {
        if page.slug.is_empty() {
            report.hard.push(GateIssue::EmptyPageSlug {
                page_id: page.id.clone(),
            });
        } else if !slugs.insert(page.slug.as_str()) {
            report.hard.push(GateIssue::DuplicatePageSlug {
                slug: page.slug.clone(),
            });
        }
    }

    for block in template.root_blocks() {
        report.soft.extend(
            validator
                .validate(block)
                .into_iter()
                .filter(|error| error.code != Some(ErrorCode::UnknownType)),
        );
    }

    report
}

/// Gate a stored JSON document, including checks only the stored shape can fail
pub fn check_stored(stored: &Value, validator: &Validator) -> GateReport {
    let mut mirror = Vec::new();
    if pages_mirror_mismatch(stored) {
        mirror.push(GateIssue::MirrorMismatch);
    }

    match Template::from_stored(stored) {
        Ok(template) => {
            let mut report = check_template(&template, validator);
            mirror.append(&mut report.hard);
            report.hard = mirror;
            report
        }
        Err(err) => {
            mirror.insert(
                0,
                GateIssue::Malformed {
                    message: err.to_string(),
                },
            );
            GateReport {
                hard: mirror,
                soft: Vec::new(),
            }
        }
    }
}
