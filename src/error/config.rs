//! Dependency document and configuration errors

use super::FhirPkgError;

/// Creates a dependency document read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a dependency document parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a missing default directory
pub fn no_default_directory(message: impl Into<String>) -> FhirPkgError {
    FhirPkgError::NoDefaultDirectory {
        message: message.into(),
    }
}
