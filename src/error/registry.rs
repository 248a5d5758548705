//! Registry transport errors

use super::FhirPkgError;

/// Creates a registry request failed error
pub fn request_failed(url: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::RegistryRequestFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an archive extraction failed error
pub fn extraction_failed(name: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::ArchiveExtractionFailed {
        name: name.into(),
        reason: reason.into(),
    }
}
