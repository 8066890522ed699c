//! Fixed names and defaults.
//!
//! Downstream tooling locates generated files by these exact names, so they
//! are part of the output contract and must not drift.

/// Default registry prefix for base and lesson images.
pub const DEFAULT_REGISTRY_ROOT: &str = "ghcr.io/airnub-labs/templates";

/// Registry sub-path under which published lesson images live.
pub const LESSON_IMAGE_NAMESPACE: &str = "lessons";

/// Default catalog directory holding one sub-directory per service.
pub const DEFAULT_CATALOG_ROOT: &str = "services";

/// Default root for both generated trees.
pub const DEFAULT_OUTPUT_ROOT: &str = ".";

/// Default value of the `GIT_SHA` build argument.
pub const DEFAULT_REVISION: &str = "local-dev";

/// Build-context trees are written to `<output_root>/<this>/<slug>`.
pub const BUILD_CONTEXT_SUBDIR: &str = "images/presets/generated";

/// Consumer trees are written to `<output_root>/<this>/<slug>`.
pub const CONSUMER_SUBDIR: &str = "templates/generated";

/// Directory holding the workspace descriptor in both trees.
pub const DEVCONTAINER_DIR: &str = ".devcontainer";

/// Workspace descriptor filename.
pub const DEVCONTAINER_FILE: &str = "devcontainer.json";

/// Build-context descriptor filename.
pub const DOCKERFILE: &str = "Dockerfile";

/// Aggregate orchestration filename.
pub const AGGREGATE_COMPOSE_FILE: &str = "docker-compose.classroom.yml";

/// Dependency-lock document filename.
pub const LOCK_FILE: &str = "stack.lock.json";

/// Secrets-placeholder filename.
pub const SECRETS_FILE: &str = ".env.example";

/// Generation-summary filename.
pub const SUMMARY_FILE: &str = "GENERATION-SUMMARY.md";

/// Services-readme filename.
pub const SERVICES_README_FILE: &str = "README-SERVICES.md";

/// Starter-repository pointer filename.
pub const STARTER_REPO_FILE: &str = "starter-repo.json";

/// Sub-directory of the build-context tree receiving copied catalog entries.
pub const SERVICES_DIR: &str = "services";

/// Reserved environment-example filename inside a catalog entry.
pub const CATALOG_ENV_EXAMPLE: &str = ".env.example";

/// Prefix of the copied environment example, suffixed with the service name.
pub const ENV_EXAMPLE_PREFIX: &str = ".env.example-";

/// Extension (without dot) identifying orchestration fragment files.
pub const FRAGMENT_EXTENSION: &str = "yml";

/// Name of the shared network injected into the aggregate file.
pub const CLASSROOM_NETWORK: &str = "classroom";

/// Source reference stamped on every lesson image.
pub const IMAGE_SOURCE: &str = "https://github.com/airnub-labs/devcontainers-catalog";

/// Label namespace for the identifying lesson labels.
pub const LABEL_NAMESPACE: &str = "edu.airnub";

/// Workspace folder used by the published-image descriptor.
pub const WORKSPACE_FOLDER: &str = "/work";

/// Editor settings forced into every workspace descriptor.
pub const FORCED_SETTINGS: [(&str, &str); 2] = [
    ("remote.downloadExtensionsLocally", "always"),
    ("telemetry.telemetryLevel", "off"),
];

/// Lock key of the base image entry.
pub const LOCK_BASE_KEY: &str = "lesson-base";

/// Lock key of the published lesson image entry.
pub const LOCK_RUNTIME_KEY: &str = "lesson-runtime";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "lforge";
