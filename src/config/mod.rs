//! Configuration handling for fhirpkg
//!
//! This module contains:
//! - `sushi-config.yaml` style dependency documents
//! - Default cache and output locations
//! - The immutable per-run configuration

pub mod defaults;
pub mod dependencies;
pub mod run;

// Re-export commonly used types
pub use defaults::DefaultLocations;
pub use dependencies::DependencyDocument;
pub use run::RunConfig;
