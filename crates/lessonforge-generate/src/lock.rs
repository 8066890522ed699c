//! Dependency-lock document.
//!
//! Records every image a lesson depends on under a stable key, with an empty
//! digest to be filled in after publishing. Keys depend only on the manifest
//! and the catalog, never on digests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lessonforge_common::config::ForgeConfig;
use lessonforge_common::constants;
use lessonforge_common::error::Result;
use lessonforge_common::types::{ImageRef, Slug};
use lessonforge_manifest::{Manifest, decode};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::fsutil;
use crate::registry::ServiceRegistry;
use crate::services::ResolvedServices;

/// Contents of `stack.lock.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackLock {
    /// Lesson slug.
    pub slug: String,
    /// SHA-256 of the manifest text the lock was generated from.
    pub manifest_sha256: String,
    /// Image entries by logical key.
    pub images: BTreeMap<String, ImageRef>,
}

/// Everything [`build_stack_lock`] reads.
#[derive(Debug, Clone, Copy)]
pub struct LockInputs<'a> {
    /// Mapped manifest.
    pub manifest: &'a Manifest,
    /// Raw manifest text.
    pub manifest_text: &'a str,
    /// Lesson slug.
    pub slug: &'a Slug,
    /// Registry coordinates.
    pub config: &'a ForgeConfig,
    /// Resolved catalog services.
    pub resolved: &'a ResolvedServices,
    /// Service lookup tables.
    pub registry: &'a ServiceRegistry,
    /// Build-context tree holding the copied fragments.
    pub build_dir: &'a Path,
}

/// Builds the lock, or `None` when the manifest names no base image or tag.
///
/// Service entries are keyed `<service>:<unit>` and read from the copied
/// fragment files. A missing or unreadable fragment, a unit without an
/// `image`, or an image that still contains a `${...}` substitution
/// contributes no entry. Every entry starts with an empty digest.
pub fn build_stack_lock(inputs: &LockInputs<'_>) -> Option<StackLock> {
    let spec = &inputs.manifest.spec;
    let (Some(base), Some(tag)) = (spec.base_preset.as_deref(), spec.image_tag_strategy.as_deref()) else {
        tracing::debug!("no base image or tag, skipping lock");
        return None;
    };

    let mut images = BTreeMap::new();
    let _ = images.insert(
        constants::LOCK_BASE_KEY.to_owned(),
        pending_digest(&inputs.config.base_image(base, tag)),
    );

    for name in &inputs.resolved.names {
        let service_dir = inputs.build_dir.join(constants::SERVICES_DIR).join(name);
        for unit in inputs.registry.units(name) {
            if let Some(reference) = fragment_image(&service_dir.join(&unit.file), &unit.unit) {
                let _ = images.insert(format!("{name}:{}", unit.unit), pending_digest(&reference));
            }
        }
    }

    let _ = images.insert(
        constants::LOCK_RUNTIME_KEY.to_owned(),
        pending_digest(&inputs.config.lesson_image(inputs.slug, tag)),
    );

    Some(StackLock {
        slug: inputs.slug.to_string(),
        manifest_sha256: format!("{:x}", Sha256::digest(inputs.manifest_text.as_bytes())),
        images,
    })
}

/// Digests are filled in after publishing, never copied from a reference.
fn pending_digest(reference: &str) -> ImageRef {
    ImageRef {
        digest: String::new(),
        ..ImageRef::parse(reference)
    }
}

/// Reads `services.<unit>.image` from a fragment.
fn fragment_image(path: &Path, unit: &str) -> Option<String> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "fragment absent, no lock entry");
        return None;
    }
    let tree = match std::fs::read_to_string(path) {
        Ok(text) => decode::decode(&text).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let tree = match tree {
        Ok(tree) => tree,
        Err(reason) => {
            tracing::debug!(path = %path.display(), %reason, "fragment unreadable, no lock entry");
            return None;
        }
    };
    tree.get("services")
        .and_then(|s| s.get(unit))
        .and_then(|u| u.get("image"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|i| !i.is_empty() && !i.contains("${"))
        .map(str::to_owned)
}

/// Writes `stack.lock.json` into `dir`.
///
/// # Errors
///
/// Returns an I/O or serialization error.
pub fn write_stack_lock(lock: &StackLock, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(constants::LOCK_FILE);
    tracing::info!(path = %path.display(), entries = lock.images.len(), "writing stack lock");
    fsutil::write_json(&path, lock)?;
    Ok(path)
}
