//! Generation pipeline that turns one manifest into both output trees.

use std::path::Path;

use lessonforge_common::config::ForgeConfig;
use lessonforge_common::constants;
use lessonforge_common::error::Result;
use lessonforge_manifest::{Manifest, derive_slug, partition_spec_fields, validate};

use crate::aggregate::write_aggregate_compose;
use crate::fsutil;
use crate::lock::{LockInputs, build_stack_lock, write_stack_lock};
use crate::registry::ServiceRegistry;
use crate::report::{GenerationReport, Warning};
use crate::scaffold::{self, collect_ports_attributes};
use crate::services::CatalogResolver;
use crate::summary::{
    SummaryInputs, write_secrets_placeholders, write_services_readme, write_starter_repo_metadata,
    write_summary,
};

/// Coordinates decoding, catalog resolution, and every emitter.
///
/// A generator holds no state between runs; calling [`Generator::generate`]
/// twice on the same manifest rewrites the same files with the same content.
#[derive(Debug, Clone)]
pub struct Generator {
    config: ForgeConfig,
    registry: ServiceRegistry,
}

impl Generator {
    /// Creates a generator with explicit configuration and lookup tables.
    #[must_use]
    pub const fn new(config: ForgeConfig, registry: ServiceRegistry) -> Self {
        Self { config, registry }
    }

    /// Creates a generator using the built-in service tables.
    #[must_use]
    pub fn with_config(config: ForgeConfig) -> Self {
        Self::new(config, ServiceRegistry::builtin())
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Generates the build-context and consumer trees for one manifest.
    ///
    /// Nothing is written until the manifest has been found, decoded, and
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns `MissingManifest`, `Decode`, or `InvalidManifest` before any
    /// output is written; `AggregateConstruction` when orchestration units
    /// conflict; `Io` or `Serialization` when writing fails. A failure after
    /// writing has started may leave a partial tree, which the next run
    /// overwrites.
    pub fn generate(&self, manifest_path: &Path) -> Result<GenerationReport> {
        let loaded = Manifest::load(manifest_path)?;
        let manifest = &loaded.manifest;
        let spec = &manifest.spec;

        validate(manifest)?;
        let (_, tag) = scaffold::image_fields(spec)?;
        let slug = derive_slug(&manifest.metadata)?;
        tracing::info!(slug = %slug, "derived lesson slug");

        let mut warnings = Vec::new();
        let (unsupported, unknown) = partition_spec_fields(loaded.tree.get("spec"));
        warnings.extend(unsupported.into_iter().map(Warning::UnsupportedSpecField));
        warnings.extend(unknown.into_iter().map(Warning::UnrecognizedSpecField));

        let build_dir = self.config.build_context_dir(&slug);
        let consumer_dir = self.config.consumer_dir(&slug);

        tracing::info!("phase 1/4: build-context scaffold");
        scaffold::write_build_scaffold(manifest, &self.config, &build_dir)?;

        tracing::info!("phase 2/4: catalog services");
        let resolver = CatalogResolver::new(self.config.catalog_root());
        let resolved = resolver.resolve(&spec.service_requests(), &build_dir)?;
        warnings.extend(resolved.invalid.iter().cloned().map(Warning::InvalidServiceName));
        warnings.extend(resolved.missing.iter().cloned().map(Warning::MissingServiceFragment));

        let aggregate_compose = write_aggregate_compose(
            spec.emit_aggregate_compose,
            &resolved,
            &self.registry,
            &build_dir,
        )?;
        let services_readme = write_services_readme(&resolved.names, &self.registry, &build_dir)?;

        tracing::info!("phase 3/4: lock and summary");
        let secret_names = spec.secret_names();
        let secrets = write_secrets_placeholders(&secret_names, &build_dir)?;

        let stack_lock = build_stack_lock(&LockInputs {
            manifest,
            manifest_text: &loaded.text,
            slug: &slug,
            config: &self.config,
            resolved: &resolved,
            registry: &self.registry,
            build_dir: &build_dir,
        })
        .map(|lock| write_stack_lock(&lock, &build_dir))
        .transpose()?;

        let summary = write_summary(
            &SummaryInputs {
                slug: &slug,
                secrets: &secret_names,
                env_examples: &resolved.env_examples,
                aggregate_compose: aggregate_compose.as_deref(),
                services_readme: services_readme.as_deref(),
                missing: &resolved.missing,
                resources: spec.resources.as_ref(),
            },
            &build_dir,
        )?;

        tracing::info!("phase 4/4: consumer scaffold");
        let lesson_image = self.config.lesson_image(&slug, tag);
        let ports = collect_ports_attributes(&resolved.names, &self.registry);
        scaffold::write_published_scaffold(manifest, &lesson_image, &ports, &consumer_dir)?;
        if let Some(secrets) = &secrets {
            fsutil::copy_file(secrets, &consumer_dir.join(constants::SECRETS_FILE))?;
        }
        if let Some(lock) = &stack_lock {
            fsutil::copy_file(lock, &consumer_dir.join(constants::LOCK_FILE))?;
        }
        let starter_repo = write_starter_repo_metadata(spec.starter_repo.as_ref(), &consumer_dir)?;

        for warning in &warnings {
            tracing::warn!(%warning, "generation warning");
        }
        tracing::info!(
            build = %build_dir.display(),
            consumer = %consumer_dir.display(),
            warnings = warnings.len(),
            "generation complete"
        );

        Ok(GenerationReport {
            slug,
            build_dir,
            consumer_dir,
            lesson_image,
            services: resolved.names,
            missing: resolved.missing,
            env_examples: resolved.env_examples,
            aggregate_compose,
            stack_lock,
            services_readme,
            secrets,
            starter_repo,
            summary,
            warnings,
        })
    }
}
