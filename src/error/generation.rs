//! Snapshot generation errors

use super::FhirPkgError;

/// Creates a snapshot generation failed error
pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::SnapshotGenerationFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a base definition not found error
pub fn base_not_found(url: impl Into<String>, base: impl Into<String>) -> FhirPkgError {
    FhirPkgError::BaseDefinitionNotFound {
        url: url.into(),
        base: base.into(),
    }
}

/// Creates a resource parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::ResourceParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
