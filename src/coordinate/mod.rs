//! Package coordinates
//!
//! A coordinate names a FHIR package and optionally pins its version:
//! - Requested on the command line as `name@version` or `name`
//! - Declared as dependency edges in `package.json` as `name` -> `version`
//!
//! ## Module Organization
//!
//! - `collector.rs`: Order-preserving, duplicate-suppressing request set

pub mod collector;

pub use collector::CoordinateCollector;

use std::fmt;

use crate::error::{Result, invalid_coordinate};

/// A package name plus optional version; no version means "latest available"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageCoordinate {
    pub name: String,
    pub version: Option<String>,
}

impl PackageCoordinate {
    /// Create a coordinate, treating a blank version as unspecified
    pub fn new(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string),
        }
    }

    /// Parse a requested coordinate (`name@version` or `name`)
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (name, version) = match input.split_once('@') {
            Some((name, version)) => (name.trim(), Some(version)),
            None => (input, None),
        };

        if name.is_empty() {
            return Err(invalid_coordinate(input));
        }

        Ok(Self::new(name, version))
    }
}

impl fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}
