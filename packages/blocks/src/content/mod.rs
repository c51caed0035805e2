//! Content payloads, one module per family of block types.

mod action;
mod chrome;
mod grid;
mod hero;
mod link;
mod media;
mod quote;
mod scheduler;
mod services;
mod text;

pub use action::{ButtonContent, CtaContent};
pub use chrome::{FooterContent, HeaderContent};
pub use grid::GridContent;
pub use hero::HeroContent;
pub use link::Link;
pub use media::{AudioContent, ImageContent, VideoContent};
pub use quote::{QuoteContent, TestimonialContent};
pub use scheduler::SchedulerContent;
pub use services::{ServiceItem, ServicesContent};
pub use text::TextContent;

use crate::kind::BlockKind;
use crate::schema::{Field, Schema};
use crate::validate::Checker;
use serde::Serialize;
use serde_json::{Map, Value};

/// Behavior every block variant provides
///
/// - `from_raw` folds legacy aliases into canonical fields and fills
///   type-appropriate defaults; it must be idempotent over its own output
/// - `check` reports field-level errors without mutating
/// - `default_content` is a minimally valid instance
pub trait ContentSchema: Sized + Serialize {
    const KIND: BlockKind;
    const FIELDS: &'static [Field];

    fn from_raw(raw: &Map<String, Value>) -> Self;

    fn check(&self, checker: &mut Checker<'_>);

    fn default_content() -> Self;

    fn schema() -> Schema {
        Schema {
            kind: Self::KIND,
            fields: Self::FIELDS,
        }
    }
}
