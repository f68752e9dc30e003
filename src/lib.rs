//! Release bundling for prebuilt executables.
//!
//! This crate packages a compiled executable into a single-entry zip archive,
//! hashes the archive, reads the release version from the project manifest,
//! and writes a Scoop release descriptor carrying both values. It backs the
//! `scoop-bundle` binary and can be driven programmatically for tests or
//! custom release scripts.
//!
//! # Modules
//!
//! - [`archive`] - Single-entry zip archive creation
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Bundle paths with overridable defaults
//! - [`descriptor`] - Release descriptor templating
//! - [`digest`] - SHA-256 digests of archives
//! - [`error`] - Error types for every stage
//! - [`pipeline`] - Stage orchestration and verification
//! - [`version`] - Release version extraction from the manifest

pub mod archive;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod digest;
pub mod error;
pub mod pipeline;
pub mod version;

pub use config::BundleConfig;
pub use error::{BundleError, Result};
pub use pipeline::{BundleOutput, run_bundle, verify_bundle};
