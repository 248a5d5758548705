//! Requested coordinate collection
//!
//! Gathers coordinates from `-p` tokens and dependency documents into a single
//! request list. Insertion order is preserved and duplicates are dropped.

use std::collections::HashSet;

use crate::config::DependencyDocument;
use crate::error::Result;

use super::PackageCoordinate;

/// Order-preserving, duplicate-suppressing set of requested coordinates
#[derive(Debug, Default)]
pub struct CoordinateCollector {
    coordinates: Vec<PackageCoordinate>,
    seen: HashSet<PackageCoordinate>,
    fhir_version_hint: Option<String>,
}

impl CoordinateCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw tokens, each possibly holding several comma-separated coordinates
    pub fn add_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<()> {
        for token in tokens {
            for part in token.as_ref().split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                self.insert(PackageCoordinate::parse(part)?);
            }
        }
        Ok(())
    }

    /// Union a dependency document's coordinates into the set
    ///
    /// The document's FHIR version hint is kept unless an earlier document
    /// already supplied one.
    pub fn add_document(&mut self, document: DependencyDocument) {
        for coordinate in document.coordinates {
            self.insert(coordinate);
        }
        if self.fhir_version_hint.is_none() {
            self.fhir_version_hint = document.fhir_version;
        }
    }

    fn insert(&mut self, coordinate: PackageCoordinate) {
        if self.seen.insert(coordinate.clone()) {
            self.coordinates.push(coordinate);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Consume the collector, returning the request list and the version hint
    pub fn into_parts(self) -> (Vec<PackageCoordinate>, Option<String>) {
        (self.coordinates, self.fhir_version_hint)
    }
}
