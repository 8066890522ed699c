//! Outcome of a generation run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use lessonforge_common::types::Slug;

/// A non-fatal condition encountered during generation.
///
/// Every variant renders as a single line starting with a stable tag so that
/// log output can be grepped by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A `spec` key the generator does not know.
    UnrecognizedSpecField(String),
    /// A `spec` key that is acknowledged but not yet acted on.
    UnsupportedSpecField(String),
    /// A requested service with no catalog entry.
    MissingServiceFragment(String),
    /// A requested service name that cannot name a catalog directory.
    InvalidServiceName(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedSpecField(key) => {
                write!(f, "unrecognized-spec-field: spec.{key} is not recognized and was ignored")
            }
            Self::UnsupportedSpecField(key) => {
                write!(f, "unsupported-spec-field: spec.{key} is not supported yet and was ignored")
            }
            Self::MissingServiceFragment(name) => {
                write!(f, "missing-service-fragment: no catalog entry for service \"{name}\"")
            }
            Self::InvalidServiceName(name) => {
                write!(f, "invalid-service-name: \"{name}\" cannot name a catalog entry")
            }
        }
    }
}

/// Paths and findings of one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Lesson slug.
    pub slug: Slug,
    /// Root of the build-context tree.
    pub build_dir: PathBuf,
    /// Root of the consumer tree.
    pub consumer_dir: PathBuf,
    /// Published lesson image coordinate.
    pub lesson_image: String,
    /// Services resolved from the catalog, in request order.
    pub services: Vec<String>,
    /// Requested services absent from the catalog, in request order.
    pub missing: Vec<String>,
    /// Copied environment examples by service.
    pub env_examples: BTreeMap<String, PathBuf>,
    /// Aggregate orchestration file, when emitted.
    pub aggregate_compose: Option<PathBuf>,
    /// Dependency-lock document, when emitted.
    pub stack_lock: Option<PathBuf>,
    /// Services readme, when emitted.
    pub services_readme: Option<PathBuf>,
    /// Secrets-placeholder file, when emitted.
    pub secrets: Option<PathBuf>,
    /// Starter-repository pointer, when emitted.
    pub starter_repo: Option<PathBuf>,
    /// Generation summary.
    pub summary: PathBuf,
    /// Non-fatal findings, in the order they arose.
    pub warnings: Vec<Warning>,
}
