//! Domain primitive types used across the lessonforge workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized lesson identifier derived from `org`/`course`/`lesson`.
///
/// Used as the directory key of both generated trees and as the repository
/// name of the published lesson image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Wraps an already-normalized slug value.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tag assumed when a reference carries none.
pub const IMPLICIT_TAG: &str = "latest";

/// A container image reference split into repository, tag, and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Repository, including registry host and port when present.
    pub image: String,
    /// Tag, [`IMPLICIT_TAG`] when the reference has none.
    pub tag: String,
    /// Content digest, empty until filled in after publishing.
    pub digest: String,
}

impl ImageRef {
    /// Splits a reference such as `registry:5000/team/app:1.2@sha256:...`.
    ///
    /// The digest is everything after the last `@`. The tag is taken from the
    /// last `:` only when it occurs after the last `/`, so a registry port is
    /// never mistaken for a tag.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        let (name, digest) = reference
            .rsplit_once('@')
            .unwrap_or((reference, ""));
        let last_slash = name.rfind('/');
        let (image, tag) = match name.rfind(':') {
            Some(colon) if last_slash.is_none_or(|slash| colon > slash) => {
                (&name[..colon], &name[colon + 1..])
            }
            _ => (name, IMPLICIT_TAG),
        };
        Self {
            image: image.to_owned(),
            tag: tag.to_owned(),
            digest: digest.to_owned(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.image, self.tag)?;
        if !self.digest.is_empty() {
            write!(f, "@{}", self.digest)?;
        }
        Ok(())
    }
}
