use super::ContentSchema;
use crate::block::Block;
use crate::kind::BlockKind;
use crate::normalize::normalize;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const COLUMNS: Field = Field::new("columns", FieldType::Number)
    .with_aliases(&["cols", "columnCount", "numColumns"])
    .fallback("2");
const GAP: Field = Field::new("gap", FieldType::Choice)
    .with_aliases(&["spacing", "gutter"])
    .fallback("medium");
const ITEMS: Field =
    Field::new("items", FieldType::Blocks).with_aliases(&["blocks", "children", "cells"]);

const GAPS: &[&str] = &["small", "medium", "large"];

/// Layout container; cells are full blocks with their own ids
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridContent {
    pub columns: u32,
    pub gap: String,
    pub items: Vec<Block>,
}

impl ContentSchema for GridContent {
    const KIND: BlockKind = BlockKind::Grid;
    const FIELDS: &'static [Field] = &[COLUMNS, GAP, ITEMS];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        let items = ITEMS
            .read_list(raw)
            .iter()
            .filter_map(|item| match normalize(item) {
                Ok(block) => Some(block),
                Err(err) => {
                    tracing::warn!("dropping grid cell: {}", err);
                    None
                }
            })
            .collect();

        Self {
            columns: COLUMNS.read_number(raw, 2),
            gap: GAP
                .read_opt_text(raw)
                .map(|gap| gap.to_ascii_lowercase())
                .unwrap_or_else(|| "medium".to_string()),
            items,
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.range(&COLUMNS, self.columns, 1, 6);
        checker.choice(&GAP, &self.gap, GAPS);
        for item in &self.items {
            for error in item.content.validate(&item.id) {
                checker.push(error);
            }
        }
    }

    fn default_content() -> Self {
        Self {
            columns: 2,
            gap: "medium".to_string(),
            items: Vec::new(),
        }
    }
}
