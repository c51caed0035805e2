//! Slug normalization.
//!
//! A slug is lowercase ASCII alphanumerics separated by single hyphens,
//! with no leading or trailing hyphen.

use crate::{CommonError, CommonResult};
use uuid::Uuid;

/// Normalize arbitrary text into slug form.
///
/// Returns an empty string when the input has no usable characters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Normalize a user-supplied slug, rejecting input that normalizes to nothing
pub fn normalize_slug(input: &str) -> CommonResult<String> {
    let slug = slugify(input);
    if slug.is_empty() {
        return Err(CommonError::InvalidSlug(input.to_string()));
    }
    Ok(slug)
}

pub fn is_normalized_slug(input: &str) -> bool {
    !input.is_empty() && slugify(input) == input
}

/// Highest counter tried before falling back to a random suffix
pub const MAX_SLUG_COUNTER: u32 = 1000;

/// `base`, then `base-2` up to `base-1000`, then one `base-<random>`
pub fn slug_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((2..=MAX_SLUG_COUNTER).map(move |n| format!("{}-{}", base, n)))
        .chain(std::iter::once_with(move || format!("{}-{}", base, random_suffix())))
}

fn random_suffix() -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    suffix
}
