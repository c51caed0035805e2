use super::ContentSchema;
use crate::kind::BlockKind;
use crate::schema::{Field, FieldType};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

const IMAGE_URL: Field = Field::url("url")
    .with_aliases(&["src", "imageUrl", "image"])
    .required();
const IMAGE_ALT: Field = Field::text("alt").with_aliases(&["altText", "alt_text", "description"]);
const IMAGE_CAPTION: Field = Field::text("caption").with_aliases(&["title", "label"]);
const IMAGE_HREF: Field = Field::url("href").with_aliases(&["link", "linkUrl"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub url: String,
    pub alt: String,
    pub caption: String,
    pub href: String,
}

impl ContentSchema for ImageContent {
    const KIND: BlockKind = BlockKind::Image;
    const FIELDS: &'static [Field] = &[IMAGE_URL, IMAGE_ALT, IMAGE_CAPTION, IMAGE_HREF];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            url: IMAGE_URL.read_text(raw),
            alt: IMAGE_ALT.read_text(raw),
            caption: IMAGE_CAPTION.read_text(raw),
            href: IMAGE_HREF.read_text(raw),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&IMAGE_URL, &self.url);
        checker.media(&IMAGE_URL, &self.url);
        checker.link(&IMAGE_HREF, &self.href);
    }

    fn default_content() -> Self {
        Self {
            url: "https://placehold.co/1200x800".to_string(),
            alt: "Placeholder image".to_string(),
            caption: String::new(),
            href: String::new(),
        }
    }
}

const VIDEO_URL: Field = Field::url("url")
    .with_aliases(&["src", "videoUrl", "embedUrl", "youtubeUrl"])
    .required();
const VIDEO_TITLE: Field = Field::text("title").with_aliases(&["caption", "name"]);
const VIDEO_AUTOPLAY: Field = Field::new("autoplay", FieldType::Flag).with_aliases(&["autoPlay"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub url: String,
    pub title: String,
    pub autoplay: bool,
}

impl ContentSchema for VideoContent {
    const KIND: BlockKind = BlockKind::Video;
    const FIELDS: &'static [Field] = &[VIDEO_URL, VIDEO_TITLE, VIDEO_AUTOPLAY];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            url: VIDEO_URL.read_text(raw),
            title: VIDEO_TITLE.read_text(raw),
            autoplay: VIDEO_AUTOPLAY.read_flag(raw, false),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&VIDEO_URL, &self.url);
        checker.media(&VIDEO_URL, &self.url);
    }

    fn default_content() -> Self {
        Self {
            url: "https://example.com/video.mp4".to_string(),
            title: String::new(),
            autoplay: false,
        }
    }
}

const AUDIO_URL: Field = Field::url("url")
    .with_aliases(&["src", "audioUrl", "podcastUrl"])
    .required();
const AUDIO_TITLE: Field = Field::text("title").with_aliases(&["caption", "name"]);
const AUDIO_AUTOPLAY: Field = Field::new("autoplay", FieldType::Flag).with_aliases(&["autoPlay"]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioContent {
    pub url: String,
    pub title: String,
    pub autoplay: bool,
}

impl ContentSchema for AudioContent {
    const KIND: BlockKind = BlockKind::Audio;
    const FIELDS: &'static [Field] = &[AUDIO_URL, AUDIO_TITLE, AUDIO_AUTOPLAY];

    fn from_raw(raw: &Map<String, Value>) -> Self {
        Self {
            url: AUDIO_URL.read_text(raw),
            title: AUDIO_TITLE.read_text(raw),
            autoplay: AUDIO_AUTOPLAY.read_flag(raw, false),
        }
    }

    fn check(&self, checker: &mut Checker<'_>) {
        checker.required(&AUDIO_URL, &self.url);
        checker.media(&AUDIO_URL, &self.url);
    }

    fn default_content() -> Self {
        Self {
            url: "https://example.com/audio.mp3".to_string(),
            title: String::new(),
            autoplay: false,
        }
    }
}
