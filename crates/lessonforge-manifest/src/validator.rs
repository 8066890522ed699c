//! Structural checks on a mapped manifest.
//!
//! Checks the identifying metadata the pipeline relies on and partitions the
//! keys of `spec` into recognized, acknowledged-but-unsupported, and unknown
//! fields. Only metadata problems are fatal; spec-field findings are returned
//! for the caller to report as warnings.

use lessonforge_common::error::{ForgeError, Result};
use serde_json::Value;

use crate::model::Manifest;

/// `spec` keys the generator acts on.
pub const RECOGNIZED_SPEC_FIELDS: [&str; 11] = [
    "base_preset",
    "image_tag_strategy",
    "vscode_extensions",
    "settings",
    "features",
    "services",
    "emit_aggregate_compose",
    "env",
    "starter_repo",
    "secrets_placeholders",
    "resources",
];

/// `spec` keys that are acknowledged but not yet actioned.
pub const UNSUPPORTED_SPEC_FIELDS: [&str; 3] = ["policies", "browsers", "sidecars"];

/// Validates a mapped manifest for generation.
///
/// # Checks performed
///
/// 1. `metadata.org`, `metadata.course`, and `metadata.lesson` are non-empty.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidManifest`] naming the first empty field.
pub fn validate(manifest: &Manifest) -> Result<()> {
    tracing::debug!("validating manifest metadata");
    check_metadata(manifest)?;
    Ok(())
}

fn check_metadata(manifest: &Manifest) -> Result<()> {
    let metadata = &manifest.metadata;
    for (field, value) in [
        ("org", &metadata.org),
        ("course", &metadata.course),
        ("lesson", &metadata.lesson),
    ] {
        if value.trim().is_empty() {
            return Err(ForgeError::invalid(format!(
                "metadata.{field} must be a non-empty string"
            )));
        }
    }
    Ok(())
}

/// Splits the keys of a raw `spec` mapping into `(unsupported, unknown)`.
///
/// Recognized keys appear in neither list. Both lists are sorted. A `spec`
/// that is absent or not a mapping yields two empty lists.
pub fn partition_spec_fields(spec: Option<&Value>) -> (Vec<String>, Vec<String>) {
    let Some(Value::Object(fields)) = spec else {
        return (Vec::new(), Vec::new());
    };
    let mut unsupported = Vec::new();
    let mut unknown = Vec::new();
    for key in fields.keys() {
        if RECOGNIZED_SPEC_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if UNSUPPORTED_SPEC_FIELDS.contains(&key.as_str()) {
            unsupported.push(key.clone());
        } else {
            unknown.push(key.clone());
        }
    }
    unsupported.sort();
    unknown.sort();
    (unsupported, unknown)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Metadata;

    fn manifest_with(org: &str, course: &str, lesson: &str) -> Manifest {
        Manifest {
            metadata: Metadata {
                org: org.into(),
                course: course.into(),
                lesson: lesson.into(),
            },
            spec: crate::model::LessonSpec::default(),
        }
    }

    #[test]
    fn validate_complete_metadata_succeeds() {
        assert!(validate(&manifest_with("acme", "math", "algebra")).is_ok());
    }

    #[test]
    fn validate_blank_course_fails() {
        let err = validate(&manifest_with("acme", "  ", "algebra")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("metadata.course"), "got: {msg}");
    }

    #[test]
    fn partition_spec_fields_sorts_both_lists() {
        let spec = json!({
            "base_preset": "full",
            "sidecars": [],
            "zeta": 1,
            "browsers": [],
            "alpha": true,
            "services": ["redis"]
        });
        let (unsupported, unknown) = partition_spec_fields(Some(&spec));
        assert_eq!(unsupported, vec!["browsers", "sidecars"]);
        assert_eq!(unknown, vec!["alpha", "zeta"]);
    }

    #[test]
    fn partition_spec_fields_absent_spec() {
        let (unsupported, unknown) = partition_spec_fields(None);
        assert!(unsupported.is_empty());
        assert!(unknown.is_empty());
        let (unsupported, unknown) = partition_spec_fields(Some(&Value::Null));
        assert!(unsupported.is_empty() && unknown.is_empty());
    }

    #[test]
    fn partition_spec_fields_sets_are_disjoint() {
        for key in UNSUPPORTED_SPEC_FIELDS {
            assert!(!RECOGNIZED_SPEC_FIELDS.contains(&key));
        }
    }
}
