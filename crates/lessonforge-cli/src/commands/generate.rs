//! `lforge generate`: generate lesson artifacts from a manifest.

use std::path::PathBuf;

use clap::Args;
use lessonforge_common::config::ForgeConfig;
use lessonforge_common::constants;
use lessonforge_generate::{GenerationReport, Generator};

use crate::output;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the lesson manifest.
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Directory holding one sub-directory per catalog service.
    #[arg(long, env = "LESSONFORGE_CATALOG_ROOT", default_value = constants::DEFAULT_CATALOG_ROOT)]
    pub catalog_root: PathBuf,

    /// Root under which both generated trees are written.
    #[arg(long, env = "LESSONFORGE_OUTPUT_ROOT", default_value = constants::DEFAULT_OUTPUT_ROOT)]
    pub output_root: PathBuf,

    /// Registry prefix for base and lesson images.
    #[arg(long, env = "LESSONFORGE_REGISTRY_ROOT", default_value = constants::DEFAULT_REGISTRY_ROOT)]
    pub registry_root: String,

    /// Revision stamped into the image build argument.
    #[arg(long, env = "GIT_SHA", default_value = constants::DEFAULT_REVISION)]
    pub revision: String,
}

impl GenerateArgs {
    fn config(&self) -> ForgeConfig {
        ForgeConfig {
            catalog_root: self.catalog_root.clone(),
            output_root: self.output_root.clone(),
            registry_root: self.registry_root.clone(),
            revision: self.revision.clone(),
        }
    }
}

/// Executes the `generate` command.
///
/// # Errors
///
/// Returns an error if the manifest is missing or malformed, if the
/// aggregate compose file cannot be constructed, or if writing fails.
pub fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    tracing::info!(manifest = %args.manifest.display(), "generating lesson");
    let generator = Generator::with_config(args.config());
    let report = generator.generate(&args.manifest)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &GenerationReport) {
    for warning in &report.warnings {
        output::warn(&warning.to_string());
    }
    for (name, path) in &report.env_examples {
        output::hint(&format!("Copied {name} .env example to {}", path.display()));
    }
    if let Some(path) = &report.aggregate_compose {
        output::hint(&format!("Aggregate compose available at {}", path.display()));
    }
    if let Some(path) = &report.services_readme {
        output::hint(&format!("Service README available at {}", path.display()));
    }
    if let Some(path) = &report.stack_lock {
        output::hint(&format!("Stack lock written to {}", path.display()));
    }
    output::ok(&format!("Generated preset ctx: {}", report.build_dir.display()));
    output::ok(&format!("Generated lesson scaffold: {}", report.consumer_dir.display()));
    output::hint(&format!("Lesson image tag: {}", report.lesson_image));
}
