use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const TITLE: Field = Field::text("title").with_aliases(&["heading", "headline"]);
const SERVICES: Field = Field::new("services", FieldType::List)
    .with_aliases(&["items", "offerings", "serviceList"])
    .required();

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl ServiceItem {
    pub const NAME: Field = Field::text("name")
        .with_aliases(&["title", "label"])
        .required()
        .fallback("Service");
    pub const DESCRIPTION: Field =
        Field::text("description").with_aliases(&["desc", "details", "summary"]);
    pub const PRICE: Field = Field::text("price").with_aliases(&["cost", "rate"]);

    pub fn from_raw(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self {
                name: name.clone(),
                description: String::new(),
                price: String::new(),
            }),
            Value::Object(raw) => Some(Self {
                name: Self::NAME.read_text(raw),
                description: Self::DESCRIPTION.read_text(raw),
                price: Self::PRICE.read_text(raw),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesContent {
    pub title: String,
    pub services: Vec<ServiceItem>,
}

impl ContentSchema for ServicesContent {
    const KIND: BlockKind = BlockKind::Services;
    const FIELDS: &'static [Field] = &[TITLE, SERVICES];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            title: TITLE.read_text(raw),
            services: SERVICES
                .read_list(raw)
                .iter()
                .filter_map(ServiceItem::from_raw)
                .collect(),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        if self.services.is_empty() {
            checker.required(&SERVICES, "");
        }
        for (index, service) in self.services.iter().enumerate() {
            checker
                .nested(SERVICES.name, index)
                .required(&ServiceItem::NAME, &service.name);
        }
    }

    fn default_content() -> Self {
        Self {
            title: "Our services".to_string(),
            services: vec![ServiceItem {
                name: "Consultation".to_string(),
                description: "A friendly first conversation about what you need.".to_string(),
                price: String::new(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_services_is_not_fixable() {
        let raw = json!({ "title": "What we do", "items": [] });
        let services = ServicesContent::from_raw(raw.as_object().unwrap());

        let mut errors = Vec::new();
        services.check(&mut Checker::new("blk_s", &mut errors));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("services"));
        assert!(!errors[0].is_fixable());
    }

    #[test]
    fn test_service_entries_from_legacy_shapes() {
        let raw = json!({ "offerings": ["Haircut", { "title": "Color", "cost": 80 }] });
        let services = ServicesContent::from_raw(raw.as_object().unwrap());

        assert_eq!(services.services.len(), 2);
        assert_eq!(services.services[0].name, "Haircut");
        assert_eq!(services.services[1].name, "Color");
        assert_eq!(services.services[1].price, "80");
    }
}
