//! Dependency document (sushi-config.yaml) handling
//!
//! Only two parts of the document matter here:
//!
//! ```yaml
//! fhirVersion: 4.0.1          # scalar or sequence; first non-blank entry wins
//! dependencies:
//!   hl7.fhir.us.core: 6.1.0   # scalar version
//!   de.basisprofil.r4:
//!     version: 1.4.0          # structured value
//!     uri: http://fhir.de
//!   hl7.terminology.r4: {}    # no version, latest
//! ```
//!
//! A document without a `dependencies` key is read as the dependency mapping
//! itself, minus `fhirVersion`. Anything that is not a mapping contributes
//! nothing.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::coordinate::PackageCoordinate;
use crate::error::{Result, config_parse_failed, config_read_failed};

const DEPENDENCIES_KEY: &str = "dependencies";
const FHIR_VERSION_KEY: &str = "fhirVersion";

/// The parts of a dependency document used for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDocument {
    /// One coordinate per `dependencies` entry, in document order
    pub coordinates: Vec<PackageCoordinate>,

    /// Explicit FHIR version hint
    pub fhir_version: Option<String>,
}

impl DependencyDocument {
    /// Parse a document from YAML text
    ///
    /// Syntax errors fail; well-formed documents of the wrong shape yield an
    /// empty document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, "<inline>")
    }

    /// Read and parse a document from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_read_failed(path.display().to_string(), e.to_string()))?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let root: Value =
            serde_yaml::from_str(yaml).map_err(|e| config_parse_failed(origin, e.to_string()))?;

        let Value::Mapping(root) = root else {
            tracing::debug!("dependency document {} is not a mapping, ignoring", origin);
            return Ok(Self::default());
        };

        Ok(Self {
            coordinates: collect_dependencies(&root),
            fhir_version: extract_fhir_version(&root),
        })
    }
}

fn collect_dependencies(root: &Mapping) -> Vec<PackageCoordinate> {
    let deps = match root.get(DEPENDENCIES_KEY) {
        Some(Value::Mapping(deps)) => deps,
        Some(_) => return Vec::new(),
        None => root,
    };

    deps.iter()
        .filter_map(|(key, value)| {
            let name = scalar_to_string(key)?;
            let name = name.trim();
            if name.is_empty() || name == FHIR_VERSION_KEY {
                return None;
            }
            let version = match value {
                Value::Mapping(entry) => entry.get("version").and_then(scalar_to_string),
                other => scalar_to_string(other),
            };
            Some(PackageCoordinate::new(name, version.as_deref()))
        })
        .collect()
}

fn extract_fhir_version(root: &Mapping) -> Option<String> {
    match root.get(FHIR_VERSION_KEY)? {
        Value::Sequence(entries) => entries
            .iter()
            .filter_map(scalar_to_string)
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty()),
        other => scalar_to_string(other)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
