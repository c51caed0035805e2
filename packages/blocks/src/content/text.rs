use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const BODY: Field = Field::text("body")
    .with_aliases(&["text", "html", "markdown", "content"])
    .required()
    .fallback("Add your text here.");
const ALIGN: Field = Field::new("align", FieldType::Choice)
    .with_aliases(&["alignment", "textAlign"])
    .fallback("left");

const ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub body: String,
    pub align: String,
}

impl ContentSchema for TextContent {
    const KIND: BlockKind = BlockKind::Text;
    const FIELDS: &'static [Field] = &[BODY, ALIGN];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            body: BODY.read_text(raw),
            align: ALIGN.read_opt_text(raw).unwrap_or_else(|| "left".to_string()),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&BODY, &self.body);
        checker.choice(&ALIGN, &self.align, ALIGNMENTS);
    }

    fn default_content() -> Self {
        Self {
            body: "Add your text here.".to_string(),
            align: "left".to_string(),
        }
    }
}
