//! File system errors

use std::path::Path;

use super::FhirPkgError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> FhirPkgError {
    FhirPkgError::FileNotFound { path: path.into() }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> FhirPkgError {
    FhirPkgError::IoError {
        message: message.into(),
    }
}

pub(crate) fn read_error(path: &Path, e: &std::io::Error) -> FhirPkgError {
    read_failed(path.display().to_string(), e.to_string())
}

pub(crate) fn write_error(path: &Path, e: &std::io::Error) -> FhirPkgError {
    write_failed(path.display().to_string(), e.to_string())
}
