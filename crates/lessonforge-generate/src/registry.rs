//! Static per-service lookup tables.
//!
//! The registry knows, for every catalog service the generator supports,
//! the instructions printed in the services readme, the port labels shown in
//! the editor, the orchestration units its fragments declare, the shared
//! volumes those units mount, and whether it joins the classroom network.
//!
//! [`ServiceRegistry::builtin`] carries the shipped tables. Tests and embedders
//! can assemble a smaller registry with [`ServiceRegistry::with_service`].

use std::collections::BTreeMap;

/// One orchestration unit declared by a catalog fragment file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrchestrationUnit {
    /// Fragment filename relative to the service directory.
    pub file: String,
    /// Unit (compose service) name inside that file.
    pub unit: String,
}

impl OrchestrationUnit {
    /// Creates a unit reference.
    pub fn new(file: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            unit: unit.into(),
        }
    }
}

/// Everything the generator knows about one catalog service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceProfile {
    /// Readme lines; the first is the headline.
    pub instructions: Vec<String>,
    /// Port number to human label.
    pub ports: BTreeMap<u16, String>,
    /// Units composed into the aggregate file.
    pub units: Vec<OrchestrationUnit>,
    /// Named volumes the units mount.
    pub volumes: Vec<String>,
    /// Whether the units talk to each other over the classroom network.
    pub classroom_network: bool,
}

impl ServiceProfile {
    /// Adds a readme line.
    #[must_use]
    pub fn instruction(mut self, line: impl Into<String>) -> Self {
        self.instructions.push(line.into());
        self
    }

    /// Adds a labelled port.
    #[must_use]
    pub fn port(mut self, port: u16, label: impl Into<String>) -> Self {
        let _ = self.ports.insert(port, label.into());
        self
    }

    /// Adds an orchestration unit.
    #[must_use]
    pub fn unit(mut self, file: impl Into<String>, unit: impl Into<String>) -> Self {
        self.units.push(OrchestrationUnit::new(file, unit));
        self
    }

    /// Adds a shared volume.
    #[must_use]
    pub fn volume(mut self, name: impl Into<String>) -> Self {
        self.volumes.push(name.into());
        self
    }

    /// Marks the service as requiring the classroom network.
    #[must_use]
    pub const fn on_classroom_network(mut self) -> Self {
        self.classroom_network = true;
        self
    }
}

/// Immutable service lookup tables keyed by catalog name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceProfile>,
}

impl ServiceRegistry {
    /// Creates a registry that knows no services.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy of this registry with `name` set to `profile`.
    #[must_use]
    pub fn with_service(mut self, name: impl Into<String>, profile: ServiceProfile) -> Self {
        let _ = self.services.insert(name.into(), profile);
        self
    }

    /// The tables for the services shipped in the catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .with_service(
                "redis",
                ServiceProfile::default()
                    .instruction("Redis: `docker compose -f services/redis/docker-compose.redis.yml up -d`")
                    .port(6379, "Redis")
                    .unit("docker-compose.redis.yml", "redis"),
            )
            .with_service(
                "supabase",
                ServiceProfile::default()
                    .instruction("Supabase: `docker compose -f services/supabase/docker-compose.supabase.yml up -d`")
                    .instruction("Copy `.env.example-supabase` to `.env` before launching Supabase.")
                    .port(54322, "Supabase Postgres")
                    .port(54323, "Supabase REST")
                    .port(54324, "Supabase Realtime")
                    .port(54326, "Supabase Studio")
                    .unit("docker-compose.supabase.yml", "supabase-db")
                    .unit("docker-compose.supabase.yml", "supabase-rest")
                    .unit("docker-compose.supabase.yml", "supabase-realtime")
                    .unit("docker-compose.supabase.yml", "supabase-studio"),
            )
            .with_service(
                "kafka",
                ServiceProfile::default()
                    .instruction("Kafka: `docker compose -f services/kafka/docker-compose.kafka-kraft.yml up -d`")
                    .instruction("Optional utils: `docker compose -f services/kafka/docker-compose.kafka-utils.yml up -d`")
                    .port(9092, "Kafka Broker")
                    .unit("docker-compose.kafka-kraft.yml", "kafka")
                    .unit("docker-compose.kafka-utils.yml", "kafka-producer")
                    .unit("docker-compose.kafka-utils.yml", "kafka-consumer"),
            )
            .with_service(
                "inbucket",
                ServiceProfile::default()
                    .instruction("Inbucket: `docker compose -f services/inbucket/docker-compose.inbucket.yml up -d`")
                    .port(9000, "Inbucket UI")
                    .port(2500, "Inbucket SMTP")
                    .unit("docker-compose.inbucket.yml", "inbucket"),
            )
            .with_service(
                "prefect",
                ServiceProfile::default()
                    .instruction("Prefect: `docker compose -f services/prefect/docker-compose.prefect.yml up -d`")
                    .instruction("Review `.env.example-prefect` for optional overrides before launching.")
                    .port(4200, "Prefect UI")
                    .unit("docker-compose.prefect.yml", "prefect")
                    .on_classroom_network(),
            )
            .with_service(
                "airflow",
                ServiceProfile::default()
                    .instruction("Airflow: `docker compose -f services/airflow/docker-compose.airflow.yml up -d`")
                    .instruction("Set admin credentials in `.env.example-airflow` and copy to `.env` if needed.")
                    .port(8080, "Airflow UI")
                    .unit("docker-compose.airflow.yml", "airflow-db")
                    .unit("docker-compose.airflow.yml", "airflow-init")
                    .unit("docker-compose.airflow.yml", "airflow-webserver")
                    .unit("docker-compose.airflow.yml", "airflow-scheduler")
                    .volume("airflow-db-data")
                    .volume("airflow-dags")
                    .volume("airflow-logs")
                    .on_classroom_network(),
            )
            .with_service(
                "dagster",
                ServiceProfile::default()
                    .instruction("Dagster: `docker compose -f services/dagster/docker-compose.dagster.yml up -d`")
                    .instruction("Copy `.env.example-dagster` to `.env` if your pipelines depend on environment variables.")
                    .instruction("Update `services/dagster/example_dagster_repo` with your own project before class.")
                    .port(3000, "Dagster UI")
                    .unit("docker-compose.dagster.yml", "dagster-postgres")
                    .unit("docker-compose.dagster.yml", "dagster-webserver")
                    .unit("docker-compose.dagster.yml", "dagster-daemon")
                    .volume("dagster-db-data")
                    .volume("dagster-home")
                    .on_classroom_network(),
            )
            .with_service(
                "temporal",
                ServiceProfile::default()
                    .instruction("Temporal: `docker compose -f services/temporal/docker-compose.temporal.yml up -d`")
                    .instruction("Adjust `.env.example-temporal` for custom CORS origins before launching the UI.")
                    .port(7233, "Temporal gRPC")
                    .port(8080, "Temporal UI")
                    .unit("docker-compose.temporal.yml", "temporal-db")
                    .unit("docker-compose.temporal.yml", "temporal")
                    .unit("docker-compose.temporal.yml", "temporal-ui")
                    .volume("temporal-db-data")
                    .on_classroom_network(),
            )
    }

    /// Returns the profile of `name`, if known.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&ServiceProfile> {
        self.services.get(name)
    }

    /// Readme lines for `name`; empty when unknown.
    #[must_use]
    pub fn instructions(&self, name: &str) -> &[String] {
        self.profile(name).map_or(&[], |p| p.instructions.as_slice())
    }

    /// Port labels for `name`, if known.
    #[must_use]
    pub fn ports(&self, name: &str) -> Option<&BTreeMap<u16, String>> {
        self.profile(name).map(|p| &p.ports)
    }

    /// Orchestration units for `name`; empty when unknown.
    #[must_use]
    pub fn units(&self, name: &str) -> &[OrchestrationUnit] {
        self.profile(name).map_or(&[], |p| p.units.as_slice())
    }

    /// Shared volumes for `name`; empty when unknown.
    #[must_use]
    pub fn volumes(&self, name: &str) -> &[String] {
        self.profile(name).map_or(&[], |p| p.volumes.as_slice())
    }

    /// Whether `name` requires the classroom network.
    #[must_use]
    pub fn requires_classroom_network(&self, name: &str) -> bool {
        self.profile(name).is_some_and(|p| p.classroom_network)
    }
}
