//! Error types and handling for fhirpkg
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`package`]: Package resolution errors
//! - [`registry`]: Registry transport errors
//! - [`config`]: Dependency document and configuration errors
//! - [`fs`]: File system errors
//! - [`generation`]: Snapshot generation errors

pub mod config;
pub mod fs;
pub mod generation;
pub mod package;
pub mod registry;

#[allow(unused_imports)]
pub use config::{parse_failed as config_parse_failed, read_failed as config_read_failed};
#[allow(unused_imports)]
pub use fs::{
    io_error, not_found as file_not_found, read_failed as file_read_failed,
    write_failed as file_write_failed,
};
#[allow(unused_imports)]
pub use generation::{base_not_found, failed as generation_failed};
#[allow(unused_imports)]
pub use package::{
    invalid_coordinate, manifest_invalid as package_manifest_invalid,
    not_found as package_not_found,
};
#[allow(unused_imports)]
pub use registry::{extraction_failed, request_failed as registry_request_failed};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for fhirpkg operations
#[derive(Error, Diagnostic, Debug)]
pub enum FhirPkgError {
    // Input errors
    #[error("No packages specified and no profiles directory given")]
    #[diagnostic(
        code(fhirpkg::input::none),
        help("Use -p/--package, --sushi-deps-file, --sushi-deps-str or --profiles-dir")
    )]
    NoInputs,

    #[error("No packages loaded")]
    #[diagnostic(code(fhirpkg::input::nothing_resolved))]
    NothingResolved,

    #[error("Invalid package coordinate: '{input}'")]
    #[diagnostic(
        code(fhirpkg::package::invalid_coordinate),
        help("Coordinates look like hl7.fhir.r4.core@4.0.1 or hl7.fhir.r4.core")
    )]
    InvalidCoordinate { input: String },

    // Package errors
    #[error("Package '{name}' ({version}) not found")]
    #[diagnostic(
        code(fhirpkg::package::not_found),
        help("Check the package name and version, or the registry URL")
    )]
    PackageNotFound { name: String, version: String },

    #[error("Invalid package manifest: {path}: {reason}")]
    #[diagnostic(code(fhirpkg::package::manifest_invalid))]
    PackageManifestInvalid { path: String, reason: String },

    // Registry errors
    #[error("Registry request failed: {url}: {reason}")]
    #[diagnostic(
        code(fhirpkg::registry::request_failed),
        help("Check network access and the --registry URL")
    )]
    RegistryRequestFailed { url: String, reason: String },

    #[error("Failed to extract package archive for '{name}': {reason}")]
    #[diagnostic(code(fhirpkg::registry::extraction_failed))]
    ArchiveExtractionFailed { name: String, reason: String },

    // Configuration errors
    #[error("Failed to read dependency document: {path}")]
    #[diagnostic(code(fhirpkg::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse dependency document: {path}: {reason}")]
    #[diagnostic(code(fhirpkg::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Could not determine a default directory: {message}")]
    #[diagnostic(
        code(fhirpkg::config::no_default_dir),
        help("Pass --cache and --out explicitly")
    )]
    NoDefaultDirectory { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(fhirpkg::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(fhirpkg::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(fhirpkg::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(fhirpkg::fs::io_error))]
    IoError { message: String },

    // Generation errors
    #[error("Failed to parse resource {path}: {reason}")]
    #[diagnostic(code(fhirpkg::generation::parse_failed))]
    ResourceParseFailed { path: String, reason: String },

    #[error("Snapshot generation failed for '{url}': {reason}")]
    #[diagnostic(code(fhirpkg::generation::failed))]
    SnapshotGenerationFailed { url: String, reason: String },

    #[error("Base definition '{base}' of '{url}' not found")]
    #[diagnostic(
        code(fhirpkg::generation::base_not_found),
        help("Add the package that defines the base profile with -p")
    )]
    BaseDefinitionNotFound { url: String, base: String },
}

impl FhirPkgError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FhirPkgError::NoInputs => 2,
            FhirPkgError::NothingResolved => 3,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for FhirPkgError {
    fn from(err: std::io::Error) -> Self {
        FhirPkgError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FhirPkgError {
    fn from(err: serde_yaml::Error) -> Self {
        FhirPkgError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FhirPkgError {
    fn from(err: serde_json::Error) -> Self {
        FhirPkgError::ResourceParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FhirPkgError {
    fn from(err: reqwest::Error) -> Self {
        FhirPkgError::RegistryRequestFailed {
            url: err
                .url()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown".to_string()),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, FhirPkgError>;
