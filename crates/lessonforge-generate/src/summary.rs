//! Human-readable documents and small pointer files.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use lessonforge_common::constants;
use lessonforge_common::error::Result;
use lessonforge_common::types::Slug;
use lessonforge_manifest::{Resources, StarterRepo, value_to_text};
use serde_json::json;

use crate::fsutil;
use crate::registry::ServiceRegistry;

/// What the generation summary reports on.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInputs<'a> {
    /// Lesson slug.
    pub slug: &'a Slug,
    /// Secret names, de-duplicated.
    pub secrets: &'a [&'a str],
    /// Copied environment examples by service.
    pub env_examples: &'a BTreeMap<String, PathBuf>,
    /// Aggregate orchestration file, when emitted.
    pub aggregate_compose: Option<&'a Path>,
    /// Services readme, when emitted.
    pub services_readme: Option<&'a Path>,
    /// Requested services absent from the catalog.
    pub missing: &'a [String],
    /// Resource hints.
    pub resources: Option<&'a Resources>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Renders `GENERATION-SUMMARY.md`.
///
/// Sections appear in a fixed order and each is left out when it has
/// nothing to say: secrets, service environment files, classroom services,
/// missing fragments, resource guidance.
pub fn render_summary(inputs: &SummaryInputs<'_>) -> String {
    let mut out = format!("# Generation Summary\n\nLesson slug: `{}`\n", inputs.slug);

    if !inputs.secrets.is_empty() {
        let _ = write!(
            out,
            "\n## Secrets to Provide\n\nCopy `{}` to `.env` and set a value for each of:\n\n",
            constants::SECRETS_FILE
        );
        for name in inputs.secrets {
            let _ = writeln!(out, "- `{name}`");
        }
    }

    if !inputs.env_examples.is_empty() {
        out.push_str("\n## Service Environment Files\n\n");
        for (service, path) in inputs.env_examples {
            let _ = writeln!(out, "- {service}: review `{}` and copy it to `.env`", file_name(path));
        }
    }

    if let Some(aggregate) = inputs.aggregate_compose {
        let _ = write!(
            out,
            "\n## Classroom Services\n\nStart every selected service with:\n\n    docker compose -f {} up -d\n",
            file_name(aggregate)
        );
        if let Some(readme) = inputs.services_readme {
            let _ = writeln!(out, "\nPer-service notes are in `{}`.", file_name(readme));
        }
    }

    if !inputs.missing.is_empty() {
        out.push_str("\n## Missing Service Fragments\n\n");
        for name in inputs.missing {
            let _ = writeln!(
                out,
                "- {name}: no catalog entry found; left out of every generated file"
            );
        }
    }

    let guidance = inputs.resources.map(resource_lines).unwrap_or_default();
    if !guidance.is_empty() {
        out.push_str("\n## Resource Guidance\n\n");
        for line in guidance {
            let _ = writeln!(out, "- {line}");
        }
    }

    out
}

fn resource_lines(resources: &Resources) -> Vec<String> {
    let text = |v: &Option<serde_json::Value>| {
        v.as_ref()
            .map(|v| value_to_text(v).trim().to_owned())
            .filter(|t| !t.is_empty())
    };
    let mut lines = Vec::new();
    if let Some(cpu) = text(&resources.cpu) {
        lines.push(format!("CPUs: {cpu}"));
    }
    if let Some(memory) = text(&resources.memory) {
        lines.push(format!("Memory: {memory}"));
    }
    lines
}

/// Writes `GENERATION-SUMMARY.md` into `dir`.
///
/// # Errors
///
/// Returns [`lessonforge_common::error::ForgeError::Io`] if the write fails.
pub fn write_summary(inputs: &SummaryInputs<'_>, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(constants::SUMMARY_FILE);
    fsutil::write_text(&path, &render_summary(inputs))?;
    Ok(path)
}

/// Writes `README-SERVICES.md` when any resolved service has instructions.
///
/// # Errors
///
/// Returns [`lessonforge_common::error::ForgeError::Io`] if the write fails.
pub fn write_services_readme(
    names: &[String],
    registry: &ServiceRegistry,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let mut body = String::new();
    for name in names {
        for (index, line) in registry.instructions(name).iter().enumerate() {
            if index == 0 {
                let _ = write!(body, "\n- {line}\n");
            } else {
                let _ = writeln!(body, "  {line}");
            }
        }
    }
    if body.is_empty() {
        return Ok(None);
    }

    let file = constants::AGGREGATE_COMPOSE_FILE;
    let text = format!(
        "## Classroom Services\n\nStart everything:\n  docker compose -f {file} up -d\n\nStop:\n  docker compose -f {file} down\n{body}"
    );
    let path = dir.join(constants::SERVICES_README_FILE);
    fsutil::write_text(&path, &text)?;
    Ok(Some(path))
}

/// Writes the secrets-placeholder file, one unset `NAME=` line per secret.
///
/// # Errors
///
/// Returns [`lessonforge_common::error::ForgeError::Io`] if the write fails.
pub fn write_secrets_placeholders(secrets: &[&str], dir: &Path) -> Result<Option<PathBuf>> {
    if secrets.is_empty() {
        return Ok(None);
    }
    let mut text = String::from("# Copy this file to .env and supply the required values.\n");
    for name in secrets {
        let _ = writeln!(text, "{name}=");
    }
    let path = dir.join(constants::SECRETS_FILE);
    fsutil::write_text(&path, &text)?;
    Ok(Some(path))
}

/// Writes `starter-repo.json` when the manifest names a starter repository URL.
///
/// # Errors
///
/// Returns an I/O or serialization error.
pub fn write_starter_repo_metadata(
    starter: Option<&StarterRepo>,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some((url, starter)) = starter.and_then(|s| s.url.as_deref().map(|url| (url, s))) else {
        return Ok(None);
    };
    let mut value = json!({ "url": url });
    if let Some(path) = starter.path.as_deref() {
        value["path"] = json!(path);
    }
    let path = dir.join(constants::STARTER_REPO_FILE);
    fsutil::write_json(&path, &value)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn inputs<'a>(
        slug: &'a Slug,
        secrets: &'a [&'a str],
        env: &'a BTreeMap<String, PathBuf>,
        missing: &'a [String],
    ) -> SummaryInputs<'a> {
        SummaryInputs {
            slug,
            secrets,
            env_examples: env,
            aggregate_compose: None,
            services_readme: None,
            missing,
            resources: None,
        }
    }

    #[test]
    fn summary_omits_empty_sections() {
        let slug = Slug::new("s");
        let env = BTreeMap::new();
        let text = render_summary(&inputs(&slug, &[], &env, &[]));
        assert_eq!(text, "# Generation Summary\n\nLesson slug: `s`\n");
    }

    #[test]
    fn summary_sections_in_fixed_order() {
        let slug = Slug::new("s");
        let env = BTreeMap::from([("redis".to_owned(), PathBuf::from("/o/.env.example-redis"))]);
        let missing = vec!["mongo".to_owned()];
        let resources = Resources {
            cpu: Some(json!(4)),
            memory: Some(json!("8gb")),
        };
        let aggregate = PathBuf::from("/o/docker-compose.classroom.yml");
        let summary = SummaryInputs {
            aggregate_compose: Some(&aggregate),
            resources: Some(&resources),
            ..inputs(&slug, &["OPENAI_API_KEY"], &env, &missing)
        };
        let text = render_summary(&summary);
        let order = [
            "## Secrets to Provide",
            "## Service Environment Files",
            "## Classroom Services",
            "## Missing Service Fragments",
            "## Resource Guidance",
        ]
        .map(|h| text.find(h).expect(h));
        assert!(order.windows(2).all(|w| w[0] < w[1]), "got:\n{text}");
        assert!(text.contains("- `OPENAI_API_KEY`"));
        assert!(text.contains("`.env.example-redis`"));
        assert!(text.contains("- mongo:"));
        assert!(text.contains("- CPUs: 4\n- Memory: 8gb\n"));
    }

    #[test]
    fn services_readme_lists_instructions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_services_readme(&["kafka".into()], &ServiceRegistry::builtin(), dir.path())
            .expect("write")
            .expect("emitted");
        let text = std::fs::read_to_string(path).expect("read");
        assert!(text.starts_with("## Classroom Services\n"));
        assert!(text.contains("\n- Kafka: "));
        assert!(text.contains("\n  Optional utils: "));
    }

    #[test]
    fn services_readme_absent_without_instructions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = write_services_readme(&["custom".into()], &ServiceRegistry::builtin(), dir.path())
            .expect("write");
        assert!(out.is_none());
        assert!(!dir.path().join("README-SERVICES.md").exists());
    }

    #[test]
    fn secrets_file_lists_unset_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_secrets_placeholders(&["A", "B"], dir.path())
            .expect("write")
            .expect("emitted");
        let text = std::fs::read_to_string(path).expect("read");
        assert!(text.ends_with("\nA=\nB=\n"));
        assert!(write_secrets_placeholders(&[], dir.path()).expect("write").is_none());
    }

    #[test]
    fn starter_repo_requires_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let none = write_starter_repo_metadata(Some(&StarterRepo::default()), dir.path()).expect("write");
        assert!(none.is_none());

        let starter = StarterRepo {
            url: Some("https://example.com/repo.git".into()),
            path: Some("/workspace".into()),
        };
        let path = write_starter_repo_metadata(Some(&starter), dir.path())
            .expect("write")
            .expect("emitted");
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("json");
        assert_eq!(value, json!({"url": "https://example.com/repo.git", "path": "/workspace"}));
    }
}
