//! Typed content blocks: model, normalization, validation and autofix.

mod autofix;
mod block;
mod content;
mod error;
mod kind;
mod normalize;
mod registry;
mod rules;
mod schema;
mod validate;

pub use autofix::{autofix, AutofixOutcome, AUTOFIXED_TAG};
pub use block::{Block, BlockContent, BlockMeta};
pub use content::*;
pub use error::{BlockError, BlockResult};
pub use kind::{BlockKind, UnknownKind};
pub use normalize::{normalize, renormalize};
pub use registry::{create_default, schema_for, BlockRegistry};
pub use rules::{ContentRule, PlaceholderTextRule};
pub use schema::{Field, FieldType, Schema};
pub use validate::{is_link, is_media_url, validate, Checker, ErrorCode, ValidationError, Validator};
