use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const CTA_TITLE: Field = Field::text("title")
    .with_aliases(&["headline", "heading"])
    .required()
    .fallback("Ready to get started?");
const CTA_BODY: Field = Field::text("body").with_aliases(&["text", "description", "subtitle"]);
const CTA_BUTTON_LABEL: Field = Field::text("buttonLabel")
    .with_aliases(&["buttonText", "ctaLabel", "ctaText"])
    .required()
    .fallback("Get started");
const CTA_BUTTON_HREF: Field = Field::url("buttonHref")
    .with_aliases(&["buttonLink", "ctaHref", "ctaLink", "href", "url"])
    .required()
    .fallback("#");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaContent {
    pub title: String,
    pub body: String,
    pub button_label: String,
    pub button_href: String,
}

impl ContentSchema for CtaContent {
    const KIND: BlockKind = BlockKind::Cta;
    const FIELDS: &'static [Field] = &[CTA_TITLE, CTA_BODY, CTA_BUTTON_LABEL, CTA_BUTTON_HREF];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            title: CTA_TITLE.read_text(raw),
            body: CTA_BODY.read_text(raw),
            button_label: CTA_BUTTON_LABEL.read_text(raw),
            button_href: CTA_BUTTON_HREF.read_text(raw),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&CTA_TITLE, &self.title);
        checker.required(&CTA_BUTTON_LABEL, &self.button_label);
        checker.required(&CTA_BUTTON_HREF, &self.button_href);
        checker.link(&CTA_BUTTON_HREF, &self.button_href);
    }

    fn default_content() -> Self {
        Self {
            title: "Ready to get started?".to_string(),
            body: String::new(),
            button_label: "Get started".to_string(),
            button_href: "#".to_string(),
        }
    }
}

const BUTTON_LABEL: Field = Field::text("label")
    .with_aliases(&["text", "title"])
    .required()
    .fallback("Click here");
const BUTTON_HREF: Field = Field::url("href")
    .with_aliases(&["url", "link"])
    .required()
    .fallback("#");
const BUTTON_VARIANT: Field = Field::new("variant", FieldType::Choice)
    .with_aliases(&["style", "appearance"])
    .fallback("primary");
const BUTTON_NEW_TAB: Field =
    Field::new("newTab", FieldType::Flag).with_aliases(&["openInNewTab", "external"]);

const VARIANTS: &[&str] = &["primary", "secondary", "outline", "link"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonContent {
    pub label: String,
    pub href: String,
    pub variant: String,
    pub new_tab: bool,
}

impl ContentSchema for ButtonContent {
    const KIND: BlockKind = BlockKind::Button;
    const FIELDS: &'static [Field] = &[BUTTON_LABEL, BUTTON_HREF, BUTTON_VARIANT, BUTTON_NEW_TAB];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            label: BUTTON_LABEL.read_text(raw),
            href: BUTTON_HREF.read_text(raw),
            variant: BUTTON_VARIANT
                .read_opt_text(raw)
                .map(|variant| variant.to_ascii_lowercase())
                .unwrap_or_else(|| "primary".to_string()),
            new_tab: BUTTON_NEW_TAB.read_flag(raw, false),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&BUTTON_LABEL, &self.label);
        checker.required(&BUTTON_HREF, &self.href);
        checker.link(&BUTTON_HREF, &self.href);
        checker.choice(&BUTTON_VARIANT, &self.variant, VARIANTS);
    }

    fn default_content() -> Self {
        Self {
            label: "Click here".to_string(),
            href: "#".to_string(),
            variant: "primary".to_string(),
            new_tab: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_button_variant_is_case_folded() {
        let raw = json!({ "text": "Call us", "url": "tel:+15550100", "style": "Outline" });
        let button = ButtonContent::from_raw(raw.as_object().unwrap());

        assert_eq!(button.variant, "outline");
        let mut errors = Vec::new();
        button.check(&mut Checker::new("blk_b", &mut errors));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unknown_variant_is_fixable() {
        let mut button = ButtonContent::default_content();
        button.variant = "ghost".to_string();

        let mut errors = Vec::new();
        button.check(&mut Checker::new("blk_b", &mut errors));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, Some(ErrorCode::InvalidChoice));
        assert_eq!(errors[0].suggestion, Some(json!("primary")));
    }

    #[test]
    fn test_cta_reads_legacy_button_keys() {
        let raw = json!({ "headline": "Book today", "ctaText": "Book", "ctaLink": "/book" });
        let cta = CtaContent::from_raw(raw.as_object().unwrap());

        assert_eq!(cta.title, "Book today");
        assert_eq!(cta.button_label, "Book");
        assert_eq!(cta.button_href, "/book");
    }
}
