//! # lessonforge-common
//!
//! Shared error definitions, configuration model, constants, and domain
//! types used across the lessonforge workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and holds the primitives every generation stage agrees on:
//! the derived output filenames, the registry coordinates, and the error
//! taxonomy.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
