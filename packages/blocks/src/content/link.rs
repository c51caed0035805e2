use crate::schema::Field;
use crate::validate::{is_link, Checker};
use pagecraft_common::{is_normalized_slug, slugify};
use serde::Serialize;
use serde_json::Value;

/// Navigation entry used by headers, footers and page lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub const LABEL: Field = Field::text("label")
        .with_aliases(&["text", "title", "name"])
        .required()
        .fallback("Link");
    pub const HREF: Field = Field::url("href")
        .with_aliases(&["url", "link", "path", "slug"])
        .required()
        .fallback("#");

    const EXPLICIT_HREF: Field = Field::url("href").with_aliases(&["url", "link", "path"]);

    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }

    /// Accepts `{label, href}` objects under any legacy key, or a bare string
    /// naming a page (older page lists stored only slugs or titles).
    ///
    /// An explicit `href` is kept verbatim; only bare strings and `slug`
    /// entries are turned into site paths.
    pub fn from_raw(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::new(text.clone(), page_href(text))),
            Value::Object(raw) => {
                let href = match Self::EXPLICIT_HREF.read_opt_text(raw) {
                    Some(href) => href,
                    None => page_href(&Self::HREF.read_text(raw)),
                };
                Some(Self::new(Self::LABEL.read_text(raw), href))
            }
            _ => None,
        }
    }

    pub fn list_from_raw(items: &[Value]) -> Vec<Self> {
        items.iter().filter_map(Self::from_raw).collect()
    }

    pub fn check_list(links: &[Link], list: &str, checker: &mut Checker<'_>) {
        for (index, link) in links.iter().enumerate() {
            let mut nested = checker.nested(list, index);
            nested.required(&Self::LABEL, &link.label);
            nested.required(&Self::HREF, &link.href);
            nested.link(&Self::HREF, &link.href);
        }
    }
}

/// Bare slugs become site-relative paths; anything else is kept as given
fn page_href(text: &str) -> String {
    if text.is_empty() || is_link(text) {
        return text.to_string();
    }
    if is_normalized_slug(text) {
        return format!("/{}", text);
    }
    let slug = slugify(text);
    if slug.is_empty() || text.contains("://") {
        text.to_string()
    } else {
        format!("/{}", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_entries_become_page_links() {
        let links = Link::list_from_raw(&[json!("About Us"), json!("/contact"), json!(3)]);
        assert_eq!(
            links,
            vec![Link::new("About Us", "/about-us"), Link::new("/contact", "/contact")]
        );
    }

    #[test]
    fn test_explicit_hrefs_are_kept_verbatim() {
        let links = Link::list_from_raw(&[
            json!({ "label": "Shop", "href": "shop.example.com" }),
            json!({ "label": "Docs", "url": "www.example.com/docs" }),
            json!({ "label": "Files", "href": "ftp://files.example.com" }),
            json!({ "label": "Team", "slug": "our team" }),
            json!("Pricing"),
        ]);
        assert_eq!(
            links,
            vec![
                Link::new("Shop", "shop.example.com"),
                Link::new("Docs", "www.example.com/docs"),
                Link::new("Files", "ftp://files.example.com"),
                Link::new("Team", "/our-team"),
                Link::new("Pricing", "/pricing"),
            ]
        );

        let mut errors = Vec::new();
        Link::check_list(&links, "links", &mut Checker::new("blk_f", &mut errors));
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field.as_deref()).collect();
        assert_eq!(fields, vec!["links.0.href", "links.1.href", "links.2.href"]);
    }

    #[test]
    fn test_legacy_keys() {
        let link = Link::from_raw(&json!({ "title": "Services", "slug": "services" })).unwrap();
        assert_eq!(link, Link::new("Services", "/services"));
    }
}
