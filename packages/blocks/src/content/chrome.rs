//! Site chrome: headers and footers.

use super::{ContentSchema, Link};
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const LOGO_TEXT: Field = Field::text("logoText")
    .with_aliases(&["logo", "siteName", "brand", "title"])
    .required()
    .fallback("My Site");
const LOGO_URL: Field = Field::url("logoUrl").with_aliases(&["logoImage", "logoSrc"]);
const HEADER_LINKS: Field = Field::new("links", FieldType::Links)
    .with_aliases(&["navLinks", "navigation", "menuItems"]);
const STICKY: Field = Field::new("sticky", FieldType::Flag).with_aliases(&["isSticky", "fixed"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderContent {
    pub logo_text: String,
    pub logo_url: String,
    pub links: Vec<Link>,
    pub sticky: bool,
}

impl ContentSchema for HeaderContent {
    const KIND: BlockKind = BlockKind::Header;
    const FIELDS: &'static [Field] = &[LOGO_TEXT, LOGO_URL, HEADER_LINKS, STICKY];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            logo_text: LOGO_TEXT.read_text(raw),
            logo_url: LOGO_URL.read_text(raw),
            links: Link::list_from_raw(HEADER_LINKS.read_list(raw)),
            sticky: STICKY.read_flag(raw, false),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&LOGO_TEXT, &self.logo_text);
        checker.media(&LOGO_URL, &self.logo_url);
        Link::check_list(&self.links, HEADER_LINKS.name, checker);
    }

    fn default_content() -> Self {
        Self {
            logo_text: "My Site".to_string(),
            logo_url: String::new(),
            links: vec![Link::new("Home", "/")],
            sticky: false,
        }
    }
}

const FOOTER_TEXT: Field = Field::text("text").with_aliases(&["copyright", "footerText"]);
const FOOTER_LINKS: Field = Field::new("links", FieldType::Links)
    .with_aliases(&["footerLinks", "pageLinks", "pages"]);
const SOCIAL: Field =
    Field::new("social", FieldType::Links).with_aliases(&["socialLinks", "socials"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterContent {
    pub text: String,
    pub links: Vec<Link>,
    pub social: Vec<Link>,
}

impl ContentSchema for FooterContent {
    const KIND: BlockKind = BlockKind::Footer;
    const FIELDS: &'static [Field] = &[FOOTER_TEXT, FOOTER_LINKS, SOCIAL];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            text: FOOTER_TEXT.read_text(raw),
            links: Link::list_from_raw(FOOTER_LINKS.read_list(raw)),
            social: Link::list_from_raw(SOCIAL.read_list(raw)),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        Link::check_list(&self.links, FOOTER_LINKS.name, checker);
        Link::check_list(&self.social, SOCIAL.name, checker);
    }

    fn default_content() -> Self {
        Self {
            text: "All rights reserved.".to_string(),
            links: Vec::new(),
            social: Vec::new(),
        }
    }
}
