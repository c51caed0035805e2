//! Identifier generation.
//!
//! Ids are opaque strings of the form `<prefix>_<uuid-simple>`. They are
//! assigned once and never rewritten by later edits.

use uuid::Uuid;

pub const BLOCK_ID_PREFIX: &str = "blk";
pub const PAGE_ID_PREFIX: &str = "pg";
pub const SESSION_ID_PREFIX: &str = "ses";

/// Generate a fresh id with the given prefix
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

pub fn new_block_id() -> String {
    new_id(BLOCK_ID_PREFIX)
}

pub fn new_page_id() -> String {
    new_id(PAGE_ID_PREFIX)
}

pub fn new_session_id() -> String {
    new_id(SESSION_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_unique() {
        let a = new_block_id();
        let b = new_block_id();

        assert!(a.starts_with("blk_"));
        assert_ne!(a, b);
        assert_eq!(a.len(), "blk_".len() + 32);
    }
}
