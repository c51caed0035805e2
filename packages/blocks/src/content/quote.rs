use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const QUOTE_TEXT: Field = Field::text("text")
    .with_aliases(&["quote", "body", "content"])
    .required();
const QUOTE_AUTHOR: Field = Field::text("author").with_aliases(&["cite", "attribution", "by"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteContent {
    pub text: String,
    pub author: String,
}

impl ContentSchema for QuoteContent {
    const KIND: BlockKind = BlockKind::Quote;
    const FIELDS: &'static [Field] = &[QUOTE_TEXT, QUOTE_AUTHOR];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            text: QUOTE_TEXT.read_text(raw),
            author: QUOTE_AUTHOR.read_text(raw),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&QUOTE_TEXT, &self.text);
    }

    fn default_content() -> Self {
        Self {
            text: "Quality work, every time.".to_string(),
            author: String::new(),
        }
    }
}

const TESTIMONIAL_QUOTE: Field = Field::text("quote")
    .with_aliases(&["text", "body", "review", "testimonial"])
    .required();
const TESTIMONIAL_AUTHOR: Field = Field::text("author")
    .with_aliases(&["name", "reviewer"])
    .required()
    .fallback("Anonymous");
const TESTIMONIAL_ROLE: Field = Field::text("role").with_aliases(&["title", "company", "position"]);
const TESTIMONIAL_AVATAR: Field =
    Field::url("avatarUrl").with_aliases(&["avatar", "photo", "image"]);
const TESTIMONIAL_RATING: Field = Field::new("rating", FieldType::Number)
    .with_aliases(&["stars", "score"])
    .fallback("5");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialContent {
    pub quote: String,
    pub author: String,
    pub role: String,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

impl ContentSchema for TestimonialContent {
    const KIND: BlockKind = BlockKind::Testimonial;
    const FIELDS: &'static [Field] = &[
        TESTIMONIAL_QUOTE,
        TESTIMONIAL_AUTHOR,
        TESTIMONIAL_ROLE,
        TESTIMONIAL_AVATAR,
        TESTIMONIAL_RATING,
    ];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            quote: TESTIMONIAL_QUOTE.read_text(raw),
            author: TESTIMONIAL_AUTHOR.read_text(raw),
            role: TESTIMONIAL_ROLE.read_text(raw),
            avatar_url: TESTIMONIAL_AVATAR.read_text(raw),
            rating: TESTIMONIAL_RATING.read_opt_number(raw),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&TESTIMONIAL_QUOTE, &self.quote);
        checker.required(&TESTIMONIAL_AUTHOR, &self.author);
        checker.media(&TESTIMONIAL_AVATAR, &self.avatar_url);
        if let Some(rating) = self.rating {
            checker.range(&TESTIMONIAL_RATING, rating, 1, 5);
        }
    }

    fn default_content() -> Self {
        Self {
            quote: "Friendly, fast and reliable.".to_string(),
            author: "Happy Customer".to_string(),
            role: String::new(),
            avatar_url: String::new(),
            rating: Some(5),
        }
    }
}
