//! # lessonforge-generate
//!
//! Turns a lesson manifest plus a service catalog into generated artifacts.
//!
//! Handles:
//! - **Registry**: Static per-service lookup tables.
//! - **Services**: Catalog resolution and copying into the build-context tree.
//! - **Scaffold**: Workspace descriptors and the image build recipe.
//! - **Aggregate**: One compose file extending every selected fragment.
//! - **Lock**: Image/tag/digest lock document.
//! - **Summary**: Generation summary, services readme, and pointer files.
//! - **Engine**: The [`Generator`] pipeline tying the stages together.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod aggregate;
pub mod engine;
pub mod fsutil;
pub mod lock;
pub mod registry;
pub mod report;
pub mod scaffold;
pub mod services;
pub mod summary;

pub use engine::Generator;
pub use report::{GenerationReport, Warning};
