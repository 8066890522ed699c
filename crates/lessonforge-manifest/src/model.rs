//! Typed view of a decoded lesson manifest.
//!
//! The value tree produced by the decoder is mapped onto these structs with
//! serde. Mapping is lenient where manifests commonly are: explicit nulls
//! behave like absent fields, and scalars are coerced to text wherever text
//! is expected.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use lessonforge_common::error::{ForgeError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coerce::{self, value_to_text};
use crate::decode;

/// Root of a lesson manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    /// Identifying metadata.
    pub metadata: Metadata,
    /// Generation directives.
    #[serde(default, deserialize_with = "coerce::nullable")]
    pub spec: LessonSpec,
}

/// `metadata{org, course, lesson}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    /// Owning organization.
    #[serde(default, deserialize_with = "coerce::text")]
    pub org: String,
    /// Course within the organization.
    #[serde(default, deserialize_with = "coerce::text")]
    pub course: String,
    /// Lesson within the course.
    #[serde(default, deserialize_with = "coerce::text")]
    pub lesson: String,
}

/// The `spec` block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LessonSpec {
    /// Base preset image name, e.g. `full`.
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub base_preset: Option<String>,
    /// Tag applied to both the base and the published lesson image.
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub image_tag_strategy: Option<String>,
    /// Editor extension identifiers.
    #[serde(default, deserialize_with = "coerce::text_list")]
    pub vscode_extensions: Vec<String>,
    /// Editor settings.
    #[serde(default, deserialize_with = "coerce::nullable")]
    pub settings: Map<String, Value>,
    /// Feature declarations, copied verbatim.
    #[serde(default, deserialize_with = "coerce::nullable")]
    pub features: Map<String, Value>,
    /// Requested backing services.
    #[serde(default, deserialize_with = "coerce::nullable")]
    pub services: Vec<ServiceRequest>,
    /// Whether to emit the aggregate orchestration file.
    #[serde(default = "emit_aggregate_default", deserialize_with = "nullable_flag")]
    pub emit_aggregate_compose: bool,
    /// Container environment variables.
    #[serde(default, deserialize_with = "coerce::nullable")]
    pub env: Map<String, Value>,
    /// Optional starter repository pointer.
    #[serde(default)]
    pub starter_repo: Option<StarterRepo>,
    /// Secret names the learner must provide.
    #[serde(default, deserialize_with = "coerce::text_list")]
    pub secrets_placeholders: Vec<String>,
    /// Host resource hints.
    #[serde(default)]
    pub resources: Option<Resources>,
}

const fn emit_aggregate_default() -> bool {
    true
}

fn nullable_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(emit_aggregate_default))
}

impl Default for LessonSpec {
    fn default() -> Self {
        Self {
            base_preset: None,
            image_tag_strategy: None,
            vscode_extensions: Vec::new(),
            settings: Map::new(),
            features: Map::new(),
            services: Vec::new(),
            emit_aggregate_compose: emit_aggregate_default(),
            env: Map::new(),
            starter_repo: None,
            secrets_placeholders: Vec::new(),
            resources: None,
        }
    }
}

/// `starter_repo{url, path}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StarterRepo {
    /// Repository URL.
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub url: Option<String>,
    /// Checkout path inside the workspace.
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub path: Option<String>,
}

/// `resources{cpu, memory}`, kept as raw values until rendered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Resources {
    /// CPU count: a number or numeric text.
    #[serde(default)]
    pub cpu: Option<Value>,
    /// Memory amount, e.g. `8gb`.
    #[serde(default)]
    pub memory: Option<Value>,
}

impl Resources {
    /// Returns `true` when neither hint carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<Value>| v.as_ref().is_none_or(|v| value_to_text(v).trim().is_empty());
        blank(&self.cpu) && blank(&self.memory)
    }
}

/// A requested service: a bare name or `{name, vars}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct ServiceRequest {
    /// Catalog entry name.
    pub name: String,
    /// Override variables, values coerced to text.
    pub vars: BTreeMap<String, String>,
}

impl ServiceRequest {
    /// Creates a request without overrides.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: BTreeMap::new(),
        }
    }
}

impl TryFrom<Value> for ServiceRequest {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Object(mut entry) => {
                let name = entry
                    .remove("name")
                    .map(|n| value_to_text(&n).trim().to_owned())
                    .unwrap_or_default();
                let vars = match entry.remove("vars") {
                    None | Some(Value::Null) => BTreeMap::new(),
                    Some(Value::Object(vars)) => vars
                        .iter()
                        .map(|(k, v)| (k.clone(), value_to_text(v)))
                        .collect(),
                    Some(other) => {
                        return Err(format!(
                            "vars of service \"{name}\" must be a mapping, got {other}"
                        ));
                    }
                };
                Ok(Self { name, vars })
            }
            Value::Array(_) => Err("service entry must be a name or a mapping".to_owned()),
            scalar => Ok(Self::named(value_to_text(&scalar).trim())),
        }
    }
}

impl LessonSpec {
    /// Returns the service requests de-duplicated by name.
    ///
    /// The first occurrence of a name wins, including its overrides; order of
    /// first appearance is preserved.
    #[must_use]
    pub fn service_requests(&self) -> Vec<ServiceRequest> {
        let mut seen = HashSet::new();
        self.services
            .iter()
            .filter(|req| seen.insert(req.name.as_str()))
            .cloned()
            .collect()
    }

    /// Returns the secret placeholders, trimmed and de-duplicated in order.
    #[must_use]
    pub fn secret_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.secrets_placeholders
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty() && seen.insert(*s))
            .collect()
    }
}

/// A manifest together with the text and tree it was decoded from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    /// Typed manifest.
    pub manifest: Manifest,
    /// Decoded value tree, used for spec-field partitioning.
    pub tree: Value,
    /// Raw manifest text, used for lock provenance.
    pub text: String,
}

impl Manifest {
    /// Maps a decoded value tree onto the typed model.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::InvalidManifest`] when the tree is not a mapping
    /// or a field has an incompatible shape.
    pub fn from_value(tree: &Value) -> Result<Self> {
        if !tree.is_object() {
            return Err(ForgeError::invalid("manifest must be a mapping"));
        }
        Self::deserialize(tree).map_err(|e| ForgeError::invalid(e.to_string()))
    }

    /// Reads, decodes, and maps the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::MissingManifest`] when the file does not exist,
    /// [`ForgeError::Io`] when it cannot be read, [`ForgeError::Decode`] when
    /// the text is malformed, and [`ForgeError::InvalidManifest`] when the
    /// tree does not fit the model.
    pub fn load(path: &Path) -> Result<LoadedManifest> {
        if !path.is_file() {
            return Err(ForgeError::MissingManifest {
                path: path.to_path_buf(),
            });
        }
        tracing::info!(path = %path.display(), "loading manifest");
        let text = std::fs::read_to_string(path).map_err(|e| ForgeError::io(path, e))?;
        let tree = decode::decode(&text)?;
        let manifest = Self::from_value(&tree)?;
        Ok(LoadedManifest {
            manifest,
            tree,
            text,
        })
    }
}
