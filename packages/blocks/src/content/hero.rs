use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::Field;
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const HEADLINE: Field = Field::text("headline")
    .with_aliases(&["title", "heading"])
    .required()
    .fallback("Welcome");
const SUBHEADLINE: Field =
    Field::text("subheadline").with_aliases(&["subtitle", "subheading", "tagline"]);
const BACKGROUND_IMAGE: Field =
    Field::url("backgroundImage").with_aliases(&["image", "imageUrl", "backgroundUrl"]);
const CTA_LABEL: Field = Field::text("ctaLabel")
    .with_aliases(&["ctaText", "buttonText", "buttonLabel"])
    .fallback("Learn more");
const CTA_HREF: Field = Field::url("ctaHref")
    .with_aliases(&["ctaLink", "ctaUrl", "buttonLink", "buttonHref"])
    .fallback("#");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
    pub headline: String,
    pub subheadline: String,
    pub background_image: String,
    pub cta_label: String,
    pub cta_href: String,
}

impl ContentSchema for HeroContent {
    const KIND: BlockKind = BlockKind::Hero;
    const FIELDS: &'static [Field] = &[HEADLINE, SUBHEADLINE, BACKGROUND_IMAGE, CTA_LABEL, CTA_HREF];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            headline: HEADLINE.read_text(raw),
            subheadline: SUBHEADLINE.read_text(raw),
            background_image: BACKGROUND_IMAGE.read_text(raw),
            cta_label: CTA_LABEL.read_text(raw),
            cta_href: CTA_HREF.read_text(raw),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&HEADLINE, &self.headline);
        checker.media(&BACKGROUND_IMAGE, &self.background_image);

        // The call to action is optional, but half of one is an error
        let has_label = !self.cta_label.trim().is_empty();
        let has_href = !self.cta_href.trim().is_empty();
        if has_label && !has_href {
            checker.required(&CTA_HREF, &self.cta_href);
        }
        if has_href && !has_label {
            checker.required(&CTA_LABEL, &self.cta_label);
        }
        checker.link(&CTA_HREF, &self.cta_href);
    }

    fn default_content() -> Self {
        Self {
            headline: "Welcome".to_string(),
            subheadline: "Tell visitors what you do best.".to_string(),
            background_image: String::new(),
            cta_label: "Learn more".to_string(),
            cta_href: "#".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorCode;
    use serde_json::json;

    fn check(hero: &HeroContent) -> Vec<crate::validate::ValidationError> {
        let mut errors = Vec::new();
        hero.check(&mut Checker::new("blk_hero", &mut errors));
        errors
    }

    #[test]
    fn test_legacy_title_maps_to_headline() {
        let raw = json!({ "title": "Fresh Cuts", "buttonText": "Book", "buttonLink": "/book" });
        let hero = HeroContent::from_raw(raw.as_object().unwrap());

        assert_eq!(hero.headline, "Fresh Cuts");
        assert_eq!(hero.cta_label, "Book");
        assert_eq!(hero.cta_href, "/book");
        assert!(check(&hero).is_empty());
    }

    #[test]
    fn test_missing_headline_suggests_fallback() {
        let mut hero = HeroContent::default_content();
        hero.headline.clear();

        let errors = check(&hero);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("headline"));
        assert_eq!(errors[0].code, Some(ErrorCode::Required));
        assert_eq!(errors[0].suggestion, Some(json!("Welcome")));
    }

    #[test]
    fn test_half_a_call_to_action() {
        let mut hero = HeroContent::default_content();
        hero.cta_href.clear();

        let errors = check(&hero);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("ctaHref"));

        hero.cta_label.clear();
        assert!(check(&hero).is_empty());
    }
}
