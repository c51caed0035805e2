mod placeholder_text;

pub use placeholder_text::PlaceholderTextRule;

use crate::block::Block;
use crate::validate::ValidationError;

/// Content check layered on top of the schema checks
pub trait ContentRule: Send + Sync {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Check one block; nested blocks are visited separately
    fn check(&self, block: &Block) -> Vec<ValidationError>;
}
