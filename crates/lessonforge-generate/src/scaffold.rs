//! Workspace descriptors and the build-context recipe.
//!
//! Two descriptor variants are written per lesson: the *build* variant in the
//! build-context tree, pointing at the generated `Dockerfile`, and the
//! *published* variant in the consumer tree, pointing at the registry image.
//! Both share the editor customizations and the optional overlays.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write as _;
use std::path::Path;

use lessonforge_common::config::ForgeConfig;
use lessonforge_common::constants;
use lessonforge_common::error::{ForgeError, Result};
use lessonforge_manifest::{LessonSpec, Manifest, value_to_text};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value, json};

use crate::fsutil;
use crate::registry::ServiceRegistry;

/// Port number to human label, serialized in numeric port order as
/// `{"<port>": {"label": "<label>"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortsAttributes(pub BTreeMap<u16, String>);

impl PortsAttributes {
    /// Whether no port is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PortsAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (port, label) in &self.0 {
            map.serialize_entry(&port.to_string(), &json!({ "label": label }))?;
        }
        map.end()
    }
}

/// `build` block of the build variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSection {
    /// Recipe path relative to the descriptor directory.
    pub dockerfile: String,
    /// Build context relative to the descriptor directory.
    pub context: String,
    /// Build arguments.
    pub args: BTreeMap<String, String>,
}

/// `hostRequirements` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostRequirements {
    /// CPU count: integer, float, or verbatim text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<Value>,
    /// Memory amount as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// A workspace descriptor (`.devcontainer/devcontainer.json`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDescriptor {
    /// Display name, the lesson title.
    pub name: String,
    /// Published image reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Local build configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSection>,
    /// Workspace folder inside the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_folder: Option<String>,
    /// Editor customizations.
    pub customizations: Value,
    /// Feature declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Map<String, Value>>,
    /// Container environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_env: Option<BTreeMap<String, String>>,
    /// Host resource hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_requirements: Option<HostRequirements>,
    /// Port labels.
    #[serde(skip_serializing_if = "PortsAttributes::is_empty")]
    pub ports_attributes: PortsAttributes,
}

impl WorkspaceDescriptor {
    fn new(manifest: &Manifest) -> Self {
        Self {
            name: manifest.metadata.lesson.clone(),
            image: None,
            build: None,
            workspace_folder: None,
            customizations: build_vscode_customizations(&manifest.spec),
            features: None,
            container_env: None,
            host_requirements: None,
            ports_attributes: PortsAttributes::default(),
        }
    }
}

/// A transform applied when its manifest field is present and non-empty.
pub type Overlay = fn(WorkspaceDescriptor, &LessonSpec) -> WorkspaceDescriptor;

/// Overlays applied to both variants. Each touches a distinct field, so
/// order does not matter.
pub const OVERLAYS: [Overlay; 3] = [apply_features, apply_env, apply_resources];

/// Copies `spec.features` verbatim.
pub fn apply_features(mut descriptor: WorkspaceDescriptor, spec: &LessonSpec) -> WorkspaceDescriptor {
    if !spec.features.is_empty() {
        descriptor.features = Some(spec.features.clone());
    }
    descriptor
}

/// Copies `spec.env` with every value rendered as text.
pub fn apply_env(mut descriptor: WorkspaceDescriptor, spec: &LessonSpec) -> WorkspaceDescriptor {
    if !spec.env.is_empty() {
        descriptor.container_env = Some(
            spec.env
                .iter()
                .map(|(k, v)| (k.clone(), value_to_text(v)))
                .collect(),
        );
    }
    descriptor
}

/// Translates `spec.resources` into host requirements.
pub fn apply_resources(mut descriptor: WorkspaceDescriptor, spec: &LessonSpec) -> WorkspaceDescriptor {
    let Some(resources) = spec.resources.as_ref().filter(|r| !r.is_empty()) else {
        return descriptor;
    };
    let memory = resources
        .memory
        .as_ref()
        .map(|m| value_to_text(m).trim().to_owned())
        .filter(|m| !m.is_empty());
    descriptor.host_requirements = Some(HostRequirements {
        cpus: resources.cpu.as_ref().and_then(cpu_hint),
        memory,
    });
    descriptor
}

/// Integer when whole, float when fractional, text when not numeric.
fn cpu_hint(raw: &Value) -> Option<Value> {
    let text = value_to_text(raw);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::from(n));
    }
    match text.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => Some(Value::from(f as i64)),
        Ok(f) => Some(Number::from_f64(f).map_or_else(|| Value::String(text.to_owned()), Value::Number)),
        Err(_) => Some(Value::String(text.to_owned())),
    }
}

fn apply_overlays(descriptor: WorkspaceDescriptor, spec: &LessonSpec) -> WorkspaceDescriptor {
    OVERLAYS
        .iter()
        .fold(descriptor, |descriptor, overlay| overlay(descriptor, spec))
}

/// Builds `{"vscode": {"settings": ..., "extensions": [...]}}`.
///
/// Forced settings always win over user values. Extensions are lowercased
/// and de-duplicated, keeping first-seen order.
pub fn build_vscode_customizations(spec: &LessonSpec) -> Value {
    let mut settings = spec.settings.clone();
    for (key, value) in constants::FORCED_SETTINGS {
        let _ = settings.insert(key.to_owned(), Value::String(value.to_owned()));
    }

    let mut seen = HashSet::new();
    let extensions: Vec<String> = spec
        .vscode_extensions
        .iter()
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty() && seen.insert(ext.clone()))
        .collect();

    json!({
        "vscode": {
            "settings": settings,
            "extensions": extensions,
        }
    })
}

/// Returns `(base_preset, image_tag_strategy)`.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidManifest`] naming the absent field.
pub fn image_fields(spec: &LessonSpec) -> Result<(&str, &str)> {
    let base = spec
        .base_preset
        .as_deref()
        .ok_or_else(|| ForgeError::invalid("spec.base_preset is required"))?;
    let tag = spec
        .image_tag_strategy
        .as_deref()
        .ok_or_else(|| ForgeError::invalid("spec.image_tag_strategy is required"))?;
    Ok((base, tag))
}

/// Renders the build-context recipe.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidManifest`] when the base image fields are absent.
pub fn render_dockerfile(manifest: &Manifest, config: &ForgeConfig) -> Result<String> {
    let (base, tag) = image_fields(&manifest.spec)?;
    let metadata = &manifest.metadata;
    let labels = [
        ("org.opencontainers.image.source".to_owned(), constants::IMAGE_SOURCE.to_owned()),
        (
            "org.opencontainers.image.description".to_owned(),
            format!(
                "Lesson image for {}/{}/{}",
                metadata.org, metadata.course, metadata.lesson
            ),
        ),
        (format!("{}.org", constants::LABEL_NAMESPACE), metadata.org.clone()),
        (format!("{}.course", constants::LABEL_NAMESPACE), metadata.course.clone()),
        (format!("{}.lesson", constants::LABEL_NAMESPACE), metadata.lesson.clone()),
    ];

    let mut out = format!(
        "FROM {}\nARG GIT_SHA={}\n",
        config.base_image(base, tag),
        config.revision
    );
    let last = labels.len() - 1;
    for (index, (key, value)) in labels.iter().enumerate() {
        let prefix = if index == 0 { "LABEL " } else { "      " };
        let continuation = if index < last { " \\" } else { "" };
        let _ = writeln!(out, "{prefix}{key}={}{continuation}", Value::String(value.clone()));
    }
    Ok(out)
}

/// Writes the build variant descriptor and the recipe under `dir`.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidManifest`] when the base image fields are
/// absent, or an I/O or serialization error.
pub fn write_build_scaffold(manifest: &Manifest, config: &ForgeConfig, dir: &Path) -> Result<()> {
    let dockerfile = render_dockerfile(manifest, config)?;

    let mut descriptor = WorkspaceDescriptor::new(manifest);
    descriptor.build = Some(BuildSection {
        dockerfile: format!("../{}", constants::DOCKERFILE),
        context: "..".to_owned(),
        args: BTreeMap::from([("GIT_SHA".to_owned(), config.revision.clone())]),
    });
    let descriptor = apply_overlays(descriptor, &manifest.spec);

    tracing::info!(dir = %dir.display(), "writing build scaffold");
    fsutil::write_json(
        &dir.join(constants::DEVCONTAINER_DIR).join(constants::DEVCONTAINER_FILE),
        &descriptor,
    )?;
    fsutil::write_text(&dir.join(constants::DOCKERFILE), &dockerfile)
}

/// Writes the published variant descriptor under `dir`.
///
/// # Errors
///
/// Returns an I/O or serialization error.
pub fn write_published_scaffold(
    manifest: &Manifest,
    image: &str,
    ports: &PortsAttributes,
    dir: &Path,
) -> Result<()> {
    let mut descriptor = WorkspaceDescriptor::new(manifest);
    descriptor.image = Some(image.to_owned());
    descriptor.workspace_folder = Some(constants::WORKSPACE_FOLDER.to_owned());
    descriptor.ports_attributes = ports.clone();
    let descriptor = apply_overlays(descriptor, &manifest.spec);

    tracing::info!(dir = %dir.display(), image, "writing published scaffold");
    fsutil::write_json(
        &dir.join(constants::DEVCONTAINER_DIR).join(constants::DEVCONTAINER_FILE),
        &descriptor,
    )
}

/// Merges the port labels of every resolved service.
///
/// A port claimed by several services gets their distinct labels sorted and
/// joined with ` / `.
pub fn collect_ports_attributes(names: &[String], registry: &ServiceRegistry) -> PortsAttributes {
    let mut collected: BTreeMap<u16, BTreeSet<&str>> = BTreeMap::new();
    for name in names {
        for (port, label) in registry.ports(name).into_iter().flatten() {
            let _ = collected.entry(*port).or_default().insert(label.as_str());
        }
    }
    PortsAttributes(
        collected
            .into_iter()
            .map(|(port, labels)| (port, labels.into_iter().collect::<Vec<_>>().join(" / ")))
            .collect(),
    )
}
