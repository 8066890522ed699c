//! # lessonforge-manifest
//!
//! Decoding and interpretation of lesson manifests.
//!
//! Handles:
//! - **Decode**: Pluggable structured-text decoding, `serde_yaml` when the
//!   `yaml` feature is enabled, a `nom`-based fallback otherwise.
//! - **Model**: Typed manifest structs mapped from the decoded value tree.
//! - **Validator**: Metadata checks and spec-field partitioning.
//! - **Slug**: Lesson slug derivation from `org`/`course`/`lesson`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod coerce;
pub mod decode;
pub mod model;
pub mod slug;
pub mod validator;

pub use coerce::value_to_text;
pub use model::{LessonSpec, LoadedManifest, Manifest, Metadata, Resources, ServiceRequest, StarterRepo};
pub use slug::{derive_slug, slugify_component};
pub use validator::{partition_spec_fields, validate};
