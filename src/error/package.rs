//! Package resolution errors

use super::FhirPkgError;

/// Creates a package not found error; a missing version reads as "latest"
pub fn not_found(name: impl Into<String>, version: Option<&str>) -> FhirPkgError {
    FhirPkgError::PackageNotFound {
        name: name.into(),
        version: version.unwrap_or("latest").to_string(),
    }
}

/// Creates an invalid package manifest error
pub fn manifest_invalid(path: impl Into<String>, reason: impl Into<String>) -> FhirPkgError {
    FhirPkgError::PackageManifestInvalid {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid coordinate error
pub fn invalid_coordinate(input: impl Into<String>) -> FhirPkgError {
    FhirPkgError::InvalidCoordinate {
        input: input.into(),
    }
}
