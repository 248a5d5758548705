//! FHIR release selection
//!
//! One release is chosen per run before any snapshot is generated and never
//! changes afterwards. Priority:
//!
//! 1. The `fhirVersion` hint of the dependency document
//! 2. The declared FHIR version of the first resolved root package
//! 3. R5

use std::fmt;

use crate::package::ResolvedPackage;

/// FHIR release family used as the processing context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FhirRelease {
    #[default]
    R5,
    R4B,
    R4,
    Dstu3,
}

impl FhirRelease {
    /// Map a version string to its release family by prefix
    ///
    /// Unknown and empty versions map to R5.
    pub fn from_version(version: &str) -> Self {
        let version = version.trim().to_ascii_lowercase();
        if version.starts_with('5') {
            Self::R5
        } else if version.starts_with("4.3") {
            Self::R4B
        } else if version.starts_with('4') {
            Self::R4
        } else if version.starts_with('3') {
            Self::Dstu3
        } else {
            Self::R5
        }
    }

    /// Canonical FHIR version of the release
    pub fn fhir_version(self) -> &'static str {
        match self {
            Self::R5 => "5.0.0",
            Self::R4B => "4.3.0",
            Self::R4 => "4.0.1",
            Self::Dstu3 => "3.0.2",
        }
    }
}

impl fmt::Display for FhirRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::R5 => "R5",
            Self::R4B => "R4B",
            Self::R4 => "R4",
            Self::Dstu3 => "DSTU3",
        };
        write!(f, "{label}")
    }
}

/// Choose the release for the run
///
/// `roots` are the resolved packages in request order; only the first one is
/// consulted.
pub fn select(hint: Option<&str>, roots: &[ResolvedPackage]) -> FhirRelease {
    if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
        tracing::debug!("FHIR version {} from dependency document", hint);
        return FhirRelease::from_version(hint);
    }

    match roots.first().and_then(|root| root.fhir_version.as_deref()) {
        Some(version) => {
            tracing::debug!("FHIR version {} from first package", version);
            FhirRelease::from_version(version)
        }
        None => FhirRelease::default(),
    }
}
