//! Global configuration model for a generation run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::types::Slug;

/// Root configuration for the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Directory holding one sub-directory per catalog service.
    pub catalog_root: PathBuf,
    /// Root under which both generated trees are written.
    pub output_root: PathBuf,
    /// Registry prefix for base and lesson images.
    pub registry_root: String,
    /// Value stamped into the `GIT_SHA` build argument.
    pub revision: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from(constants::DEFAULT_CATALOG_ROOT),
            output_root: PathBuf::from(constants::DEFAULT_OUTPUT_ROOT),
            registry_root: constants::DEFAULT_REGISTRY_ROOT.to_owned(),
            revision: constants::DEFAULT_REVISION.to_owned(),
        }
    }
}

impl ForgeConfig {
    /// Returns the build-context tree root for a lesson.
    #[must_use]
    pub fn build_context_dir(&self, slug: &Slug) -> PathBuf {
        self.output_root
            .join(constants::BUILD_CONTEXT_SUBDIR)
            .join(slug.as_str())
    }

    /// Returns the consumer tree root for a lesson.
    #[must_use]
    pub fn consumer_dir(&self, slug: &Slug) -> PathBuf {
        self.output_root
            .join(constants::CONSUMER_SUBDIR)
            .join(slug.as_str())
    }

    /// Returns the catalog root.
    #[must_use]
    pub fn catalog_root(&self) -> &Path {
        &self.catalog_root
    }

    /// Returns `<registry_root>/<base>:<tag>`.
    #[must_use]
    pub fn base_image(&self, base: &str, tag: &str) -> String {
        format!("{}/{base}:{tag}", self.registry_root.trim_end_matches('/'))
    }

    /// Returns `<registry_root>/lessons/<slug>:<tag>`.
    #[must_use]
    pub fn lesson_image(&self, slug: &Slug, tag: &str) -> String {
        format!(
            "{}/{}/{slug}:{tag}",
            self.registry_root.trim_end_matches('/'),
            constants::LESSON_IMAGE_NAMESPACE
        )
    }
}
