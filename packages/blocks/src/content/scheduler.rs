use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const TITLE: Field = Field::text("title").with_aliases(&["heading", "headline"]);
const BOOKING_URL: Field = Field::url("bookingUrl")
    .with_aliases(&["url", "calendarUrl", "embedUrl", "providerUrl"])
    .required();
const DURATION: Field = Field::new("durationMinutes", FieldType::Number)
    .with_aliases(&["duration", "slotMinutes"])
    .fallback("30");
const TIMEZONE: Field = Field::text("timezone").with_aliases(&["timeZone", "tz"]);

/// Appointment booking widget backed by an external calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerContent {
    pub title: String,
    pub booking_url: String,
    pub duration_minutes: u32,
    pub timezone: String,
}

impl ContentSchema for SchedulerContent {
    const KIND: BlockKind = BlockKind::Scheduler;
    const FIELDS: &'static [Field] = &[TITLE, BOOKING_URL, DURATION, TIMEZONE];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            title: TITLE.read_text(raw),
            booking_url: BOOKING_URL.read_text(raw),
            duration_minutes: DURATION.read_number(raw, 30),
            timezone: TIMEZONE.read_text(raw),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&BOOKING_URL, &self.booking_url);
        checker.link(&BOOKING_URL, &self.booking_url);
        checker.range(&DURATION, self.duration_minutes, 5, 480);
    }

    fn default_content() -> Self {
        Self {
            title: "Book an appointment".to_string(),
            booking_url: "https://calendly.com/your-business".to_string(),
            duration_minutes: 30,
            timezone: String::new(),
        }
    }
}
