//! Lesson slug derivation.

use lessonforge_common::error::{ForgeError, Result};
use lessonforge_common::types::Slug;

use crate::model::Metadata;

/// Normalizes one identifying component.
///
/// Lowercases, collapses every run of non-alphanumeric characters into one
/// hyphen, and trims hyphens from both ends. May return an empty string.
pub fn slugify_component(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for c in value.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Derives the lesson slug from `org`, `course`, and `lesson`.
///
/// Components that normalize to nothing are dropped.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidManifest`] when every component is empty
/// after normalization.
pub fn derive_slug(metadata: &Metadata) -> Result<Slug> {
    let parts: Vec<String> = [&metadata.org, &metadata.course, &metadata.lesson]
        .into_iter()
        .map(|part| slugify_component(part))
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(ForgeError::invalid(
            "metadata does not yield a slug: org, course, and lesson normalize to nothing",
        ));
    }
    Ok(Slug::new(parts.join("-")))
}
