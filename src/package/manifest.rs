//! Package manifest (`package/package.json`) data structures

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::coordinate::PackageCoordinate;
use crate::error::{Result, package_manifest_invalid};

/// Core packages whose dependency version doubles as the FHIR version
const CORE_PACKAGES: &[&str] = &[
    "hl7.fhir.core",
    "hl7.fhir.r5.core",
    "hl7.fhir.r4b.core",
    "hl7.fhir.r4.core",
    "hl7.fhir.r3.core",
];

/// NPM-style manifest of a FHIR package
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,

    pub version: String,

    #[serde(default, rename = "fhirVersions")]
    pub fhir_versions: Vec<String>,

    #[serde(default, rename = "fhir-version-list")]
    pub fhir_version_list: Vec<String>,

    /// Dependency name -> version, in declaration order
    #[serde(default)]
    pub dependencies: Map<String, Value>,
}

impl PackageManifest {
    /// Parse a manifest from JSON text
    pub fn from_json(json: &str, origin: &Path) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| package_manifest_invalid(origin.display().to_string(), e.to_string()))?;

        if manifest.name.trim().is_empty() || manifest.version.trim().is_empty() {
            return Err(package_manifest_invalid(
                origin.display().to_string(),
                "name and version are required",
            ));
        }

        Ok(manifest)
    }

    /// Read a manifest from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| package_manifest_invalid(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json, path)
    }

    /// Declared FHIR version
    ///
    /// Taken from `fhirVersions`, then `fhir-version-list`, then the version of
    /// a core package dependency.
    pub fn fhir_version(&self) -> Option<String> {
        let declared = self
            .fhir_versions
            .iter()
            .chain(&self.fhir_version_list)
            .map(|v| v.trim())
            .find(|v| !v.is_empty());
        if let Some(version) = declared {
            return Some(version.to_string());
        }

        CORE_PACKAGES.iter().find_map(|core| {
            self.dependencies
                .get(*core)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        })
    }

    /// Dependency edges in declaration order
    pub fn dependency_edges(&self) -> Vec<PackageCoordinate> {
        self.dependencies
            .iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, version)| {
                let version = match version {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                };
                PackageCoordinate::new(name.trim(), version.as_deref())
            })
            .collect()
    }
}
