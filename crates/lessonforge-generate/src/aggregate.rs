//! Aggregate orchestration file.
//!
//! Composes every resolved service's orchestration units into one compose
//! file that `extends` the copied catalog fragments, so the stack can be
//! started with a single command.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use lessonforge_common::constants;
use lessonforge_common::error::{ForgeError, Result};
use serde_json::Value;

use crate::fsutil;
use crate::registry::ServiceRegistry;
use crate::services::ResolvedServices;

/// One unit of the aggregate file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AggregateUnit<'a> {
    service: &'a str,
    file: &'a str,
    environment: Option<&'a BTreeMap<String, String>>,
}

/// Renders the aggregate file, or `None` when there is nothing to compose.
///
/// Nothing is composed when `emit` is false or when no resolved service
/// declares an orchestration unit in `registry`.
///
/// # Errors
///
/// Returns [`ForgeError::AggregateConstruction`] when two services declare a
/// unit of the same name.
pub fn render_aggregate_compose(
    emit: bool,
    resolved: &ResolvedServices,
    registry: &ServiceRegistry,
) -> Result<Option<String>> {
    if !emit {
        tracing::debug!("aggregate compose disabled by manifest");
        return Ok(None);
    }

    let mut units: BTreeMap<&str, AggregateUnit<'_>> = BTreeMap::new();
    let mut volumes: Vec<&str> = Vec::new();
    let mut classroom_network = false;

    for name in &resolved.names {
        let declared = registry.units(name);
        if declared.is_empty() {
            tracing::debug!(service = %name, "service declares no orchestration units");
            continue;
        }
        for unit in declared {
            let candidate = AggregateUnit {
                service: name,
                file: &unit.file,
                environment: resolved.vars.get(name),
            };
            if let Some(existing) = units.get(unit.unit.as_str()) {
                if existing.service != candidate.service || existing.file != candidate.file {
                    return Err(ForgeError::AggregateConstruction {
                        message: format!(
                            "unit \"{}\" is declared by both {}/{} and {}/{}",
                            unit.unit, existing.service, existing.file, candidate.service, candidate.file
                        ),
                    });
                }
                continue;
            }
            let _ = units.insert(&unit.unit, candidate);
        }
        for volume in registry.volumes(name) {
            if !volumes.contains(&volume.as_str()) {
                volumes.push(volume);
            }
        }
        classroom_network |= registry.requires_classroom_network(name);
    }

    if units.is_empty() {
        tracing::debug!("no orchestration units resolved");
        return Ok(None);
    }

    let mut out = format!(
        "# Generated by {bin} from the selected service fragments.\n\
         # Start the stack with:\n\
         #   docker compose -f {file} up -d\n\nservices:\n",
        bin = constants::BIN_NAME,
        file = constants::AGGREGATE_COMPOSE_FILE,
    );
    for (unit_name, unit) in &units {
        let _ = write!(
            out,
            "  {unit_name}:\n    extends:\n      file: ./{dir}/{service}/{file}\n      service: {unit_name}\n",
            dir = constants::SERVICES_DIR,
            service = unit.service,
            file = unit.file,
        );
        if let Some(environment) = unit.environment.filter(|env| !env.is_empty()) {
            out.push_str("    environment:\n");
            for (key, value) in environment {
                let _ = writeln!(out, "      {}: {}", yaml_key(key), quoted(value));
            }
        }
    }

    if !volumes.is_empty() {
        out.push_str("\nvolumes:\n");
        for volume in &volumes {
            let _ = writeln!(out, "  {volume}:");
        }
    }

    if classroom_network {
        let _ = write!(
            out,
            "\nnetworks:\n  {net}:\n    name: {net}\n",
            net = constants::CLASSROOM_NETWORK
        );
    }

    Ok(Some(out))
}

/// Renders and writes the aggregate file into `dir`.
///
/// # Errors
///
/// Propagates [`render_aggregate_compose`] errors and I/O failures.
pub fn write_aggregate_compose(
    emit: bool,
    resolved: &ResolvedServices,
    registry: &ServiceRegistry,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(rendered) = render_aggregate_compose(emit, resolved, registry)? else {
        return Ok(None);
    };
    let path = dir.join(constants::AGGREGATE_COMPOSE_FILE);
    tracing::info!(path = %path.display(), "writing aggregate compose");
    fsutil::write_text(&path, &rendered)?;
    Ok(Some(path))
}

/// Double-quoted scalar; JSON string syntax is valid YAML.
fn quoted(value: &str) -> String {
    Value::String(value.to_owned()).to_string()
}

fn yaml_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if plain { key.to_owned() } else { quoted(key) }
}
