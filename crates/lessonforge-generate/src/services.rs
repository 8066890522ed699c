//! Service catalog resolution.
//!
//! Copies the catalog entries a manifest requests into the build-context tree
//! and records which fragment files, environment examples, and override
//! variables each resolved service contributes. Missing entries are recorded,
//! never fatal.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use lessonforge_common::constants;
use lessonforge_common::error::{ForgeError, Result};
use lessonforge_manifest::ServiceRequest;

use crate::fsutil;

/// Catalog artifacts for the services of one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedServices {
    /// Resolved service names in request order, without duplicates.
    pub names: Vec<String>,
    /// Copied fragment files per service, in sorted order.
    pub fragments: BTreeMap<String, Vec<PathBuf>>,
    /// Copied environment example per service.
    pub env_examples: BTreeMap<String, PathBuf>,
    /// Override variables per service; services without overrides are absent.
    pub vars: BTreeMap<String, BTreeMap<String, String>>,
    /// Requested names with no catalog entry, in request order.
    pub missing: Vec<String>,
    /// Requested names rejected as unsafe, in request order.
    pub invalid: Vec<String>,
}

impl ResolvedServices {
    /// Whether no requested service resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Resolves service requests against an on-disk catalog.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    catalog_root: PathBuf,
}

impl CatalogResolver {
    /// Creates a resolver reading `<catalog_root>/<name>/` entries.
    pub fn new(catalog_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_root: catalog_root.into(),
        }
    }

    /// Copies every requested catalog entry under `<output>/services/`.
    ///
    /// Requests are processed in order; a repeated name is ignored after its
    /// first occurrence, whether it resolved, was missing, or was rejected.
    /// Missing and rejected names are left for the caller to report. The reserved environment example of an entry is
    /// copied to `<output>/.env.example-<name>` instead of the service
    /// directory. When an entry has no top-level fragment files, fragments
    /// are discovered at any depth of the copied directory.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::Io`] if reading the catalog or writing the output
    /// fails.
    pub fn resolve(&self, requests: &[ServiceRequest], output: &Path) -> Result<ResolvedServices> {
        let services_root = output.join(constants::SERVICES_DIR);
        fsutil::ensure_dir(&services_root)?;

        let mut resolved = ResolvedServices::default();
        for request in requests {
            let name = request.name.trim();
            let seen = [&resolved.names, &resolved.missing, &resolved.invalid];
            if seen.iter().any(|list| list.iter().any(|n| n == name)) {
                continue;
            }
            if !is_safe_name(name) {
                tracing::debug!(service = name, "unsafe service name");
                resolved.invalid.push(name.to_owned());
                continue;
            }
            let src = self.catalog_root.join(name);
            if !src.is_dir() {
                tracing::debug!(service = name, catalog = %self.catalog_root.display(), "no catalog entry");
                resolved.missing.push(name.to_owned());
                continue;
            }

            tracing::info!(service = name, "merging catalog entry");
            let dest = services_root.join(name);
            let fragments = copy_entry(&src, &dest)?;
            let _ = resolved.fragments.insert(name.to_owned(), fragments);

            let env_src = src.join(constants::CATALOG_ENV_EXAMPLE);
            if env_src.is_file() {
                let env_dst = output.join(format!("{}{name}", constants::ENV_EXAMPLE_PREFIX));
                fsutil::copy_file(&env_src, &env_dst)?;
                let _ = resolved.env_examples.insert(name.to_owned(), env_dst);
            }

            if !request.vars.is_empty() {
                let _ = resolved.vars.insert(name.to_owned(), request.vars.clone());
            }
            resolved.names.push(name.to_owned());
        }
        Ok(resolved)
    }
}

/// Copies one catalog entry and returns its fragment files.
fn copy_entry(src: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    fsutil::ensure_dir(dest)?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| ForgeError::io(src, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| ForgeError::io(src, e))?;
    entries.sort_by_key(fs::DirEntry::file_name);

    let mut fragments = Vec::new();
    for entry in entries {
        let file_name = entry.file_name();
        if file_name == constants::CATALOG_ENV_EXAMPLE {
            continue;
        }
        let path = entry.path();
        let target = dest.join(&file_name);
        if path.is_dir() {
            let _ = fsutil::copy_dir_merge(&path, &target)?;
            continue;
        }
        fsutil::copy_file(&path, &target)?;
        if fsutil::has_extension(&target, constants::FRAGMENT_EXTENSION) {
            fragments.push(target);
        }
    }

    if fragments.is_empty() {
        fragments = fsutil::find_files_with_extension(dest, constants::FRAGMENT_EXTENSION)?;
    }
    Ok(fragments)
}

/// A name must be a single normal path component.
fn is_safe_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn catalog() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fsutil::write_text(
            &root.join("redis/docker-compose.redis.yml"),
            "services:\n  redis:\n    image: redis:7-alpine\n",
        )
        .expect("write");
        fsutil::write_text(&root.join("redis/.env.example"), "REDIS_PASSWORD=\n").expect("write");
        fsutil::write_text(&root.join("redis/README.md"), "notes\n").expect("write");
        fsutil::write_text(
            &root.join("dagster/compose/nested/docker-compose.dagster.yml"),
            "services: {}\n",
        )
        .expect("write");
        fsutil::write_text(&root.join("dagster/example_repo/repo.py"), "").expect("write");
        dir
    }

    fn request(name: &str, vars: &[(&str, &str)]) -> ServiceRequest {
        ServiceRequest {
            name: name.into(),
            vars: vars
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn resolve_copies_entry_and_env_example() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolver = CatalogResolver::new(catalog.path());

        let resolved = resolver
            .resolve(&[request("redis", &[("REDIS_PASSWORD", "classroom")])], out.path())
            .expect("resolve");

        assert_eq!(resolved.names, vec!["redis"]);
        let dest = out.path().join("services/redis");
        assert_eq!(resolved.fragments["redis"], vec![dest.join("docker-compose.redis.yml")]);
        assert!(dest.join("README.md").is_file());
        assert!(!dest.join(".env.example").exists());
        assert_eq!(resolved.env_examples["redis"], out.path().join(".env.example-redis"));
        assert!(out.path().join(".env.example-redis").is_file());
        assert_eq!(resolved.vars["redis"]["REDIS_PASSWORD"], "classroom");
    }

    #[test]
    fn resolve_records_missing_without_error() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolved = CatalogResolver::new(catalog.path())
            .resolve(&[request("mongo", &[("X", "1")]), request("redis", &[])], out.path())
            .expect("resolve");
        assert_eq!(resolved.missing, vec!["mongo"]);
        assert_eq!(resolved.names, vec!["redis"]);
        assert!(!resolved.vars.contains_key("mongo"));
        assert!(!out.path().join("services/mongo").exists());
    }

    #[test]
    fn resolve_duplicate_request_first_wins() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolved = CatalogResolver::new(catalog.path())
            .resolve(
                &[
                    request("redis", &[("REDIS_PASSWORD", "first")]),
                    request("redis", &[("REDIS_PASSWORD", "second")]),
                ],
                out.path(),
            )
            .expect("resolve");
        assert_eq!(resolved.names, vec!["redis"]);
        assert_eq!(resolved.vars["redis"]["REDIS_PASSWORD"], "first");
    }

    #[test]
    fn resolve_discovers_nested_fragments() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolved = CatalogResolver::new(catalog.path())
            .resolve(&[request("dagster", &[])], out.path())
            .expect("resolve");
        assert_eq!(
            resolved.fragments["dagster"],
            vec![out.path().join("services/dagster/compose/nested/docker-compose.dagster.yml")]
        );
        assert!(out.path().join("services/dagster/example_repo/repo.py").is_file());
    }

    #[test]
    fn resolve_rejects_unsafe_names() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolved = CatalogResolver::new(catalog.path())
            .resolve(
                &[request("../redis", &[]), request("", &[]), request("..", &[])],
                out.path(),
            )
            .expect("resolve");
        assert!(resolved.is_empty());
        assert_eq!(resolved.invalid, vec!["../redis", "", ".."]);
    }

    #[test]
    fn resolve_records_each_skipped_name_once() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolved = CatalogResolver::new(catalog.path())
            .resolve(
                &[
                    request("../redis", &[]),
                    request("mongo", &[]),
                    request("../redis", &[]),
                    request("mongo", &[]),
                ],
                out.path(),
            )
            .expect("resolve");
        assert_eq!(resolved.invalid, vec!["../redis"]);
        assert_eq!(resolved.missing, vec!["mongo"]);
    }

    #[test]
    fn resolve_is_repeatable() {
        let catalog = catalog();
        let out = tempfile::tempdir().expect("tempdir");
        let resolver = CatalogResolver::new(catalog.path());
        let first = resolver.resolve(&[request("redis", &[])], out.path()).expect("first");
        let second = resolver.resolve(&[request("redis", &[])], out.path()).expect("second");
        assert_eq!(first, second);
    }
}
