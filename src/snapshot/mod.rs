//! Snapshot generation seams
//!
//! Generation is an injected capability: the reconcilers only see
//! [`SnapshotGenerator`] and hand it a [`DefinitionSource`] to resolve
//! `baseDefinition` and other canonical references against.
//!
//! ## Module Organization
//!
//! - `merge.rs`: Built-in generator overlaying differentials on base snapshots

pub mod merge;

pub use merge::DifferentialMerger;

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::package::{PACKAGE_FOLDER, ResolvedPackage};
use crate::resource::str_field;

/// Resolves canonical references to conformance resources
pub trait DefinitionSource {
    /// Find a resource by canonical URL (optionally `url|version`) or by
    /// `<resourceType>/<id>`
    fn find(&self, reference: &str) -> Option<&Value>;
}

/// Produces a StructureDefinition with a snapshot section
pub trait SnapshotGenerator {
    fn generate_snapshot(
        &self,
        resource: &Value,
        context: &dyn DefinitionSource,
        url: &str,
        name: &str,
    ) -> Result<Value>;
}

/// In-memory index of conformance resources
#[derive(Debug, Default)]
pub struct DefinitionIndex {
    resources: Vec<Value>,
    keys: HashMap<String, usize>,
}

impl DefinitionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the StructureDefinitions of every package
    ///
    /// Definitions that cannot be read or parsed are skipped with a warning.
    /// When two packages define the same URL the earlier package wins.
    pub fn from_packages(packages: &[ResolvedPackage]) -> Self {
        let mut index = Self::new();
        for package in packages {
            for file in package.structure_definitions() {
                let parsed = package
                    .read_to_string(PACKAGE_FOLDER, &file)
                    .and_then(|json| serde_json::from_str::<Value>(&json).map_err(Into::into));
                match parsed {
                    Ok(resource) => index.insert(resource),
                    Err(e) => tracing::warn!(
                        "skipping {} in {}: {}",
                        file,
                        package.folder_name(),
                        e
                    ),
                }
            }
        }
        tracing::debug!("indexed {} package definitions", index.len());
        index
    }

    /// Add a resource under its URL, `url|version` and `<resourceType>/<id>`
    ///
    /// Keys already taken keep their first resource.
    pub fn insert(&mut self, resource: Value) {
        let mut keys = Vec::new();
        if let Some(url) = str_field(&resource, "url").filter(|u| !u.is_empty()) {
            keys.push(url.to_string());
            if let Some(version) = str_field(&resource, "version").filter(|v| !v.is_empty()) {
                keys.push(format!("{url}|{version}"));
            }
        }
        if let (Some(kind), Some(id)) = (
            str_field(&resource, "resourceType"),
            str_field(&resource, "id"),
        ) {
            keys.push(format!("{kind}/{id}"));
        }
        if keys.is_empty() {
            return;
        }

        let position = self.resources.len();
        let mut used = false;
        for key in keys {
            if !self.keys.contains_key(&key) {
                self.keys.insert(key, position);
                used = true;
            }
        }
        if used {
            self.resources.push(resource);
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl DefinitionSource for DefinitionIndex {
    /// A `url|version` reference with no exact match falls back to the
    /// resource indexed under the bare URL, whatever its version.
    fn find(&self, reference: &str) -> Option<&Value> {
        if let Some(position) = self.keys.get(reference) {
            return self.resources.get(*position);
        }

        let (url, _) = reference.split_once('|')?;
        let resource = self.resources.get(*self.keys.get(url)?)?;
        tracing::debug!(
            "no definition for {}, using {} version {}",
            reference,
            url,
            str_field(resource, "version").unwrap_or("(none)")
        );
        Some(resource)
    }
}

/// Consults `primary` first and falls back to `fallback`
pub struct LayeredSource<'a> {
    primary: &'a dyn DefinitionSource,
    fallback: &'a dyn DefinitionSource,
}

impl<'a> LayeredSource<'a> {
    pub fn new(primary: &'a dyn DefinitionSource, fallback: &'a dyn DefinitionSource) -> Self {
        Self { primary, fallback }
    }
}

impl DefinitionSource for LayeredSource<'_> {
    fn find(&self, reference: &str) -> Option<&Value> {
        self.primary
            .find(reference)
            .or_else(|| self.fallback.find(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{CachedPackage, create_temp_dir};
    use serde_json::json;

    #[test]
    fn test_index_keys() {
        let mut index = DefinitionIndex::new();
        index.insert(json!({
            "resourceType": "StructureDefinition",
            "id": "p",
            "url": "http://example.org/StructureDefinition/p",
            "version": "1.0.0"
        }));

        assert_eq!(index.len(), 1);
        assert!(index.find("http://example.org/StructureDefinition/p").is_some());
        assert!(index.find("http://example.org/StructureDefinition/p|1.0.0").is_some());
        assert!(index.find("http://example.org/StructureDefinition/p|2.0.0").is_some());
        assert!(index.find("StructureDefinition/p").is_some());
        assert!(index.find("http://example.org/StructureDefinition/q").is_none());
    }

    #[test]
    fn test_versioned_lookup_falls_back_to_url() {
        let mut index = DefinitionIndex::new();
        index.insert(json!({"resourceType": "ValueSet", "id": "v1", "url": "http://x/vs", "version": "1.0.0"}));
        index.insert(json!({"resourceType": "ValueSet", "id": "v2", "url": "http://x/vs", "version": "2.0.0"}));

        assert_eq!(index.find("http://x/vs|2.0.0").unwrap()["id"], "v2");
        assert_eq!(index.find("http://x/vs|3.0.0").unwrap()["id"], "v1");
        assert!(index.find("http://x/other|1.0.0").is_none());
        assert!(index.find("ValueSet/v3|1.0.0").is_none());
    }

    #[test]
    fn test_first_definition_wins() {
        let mut index = DefinitionIndex::new();
        index.insert(json!({"resourceType": "StructureDefinition", "id": "a", "url": "http://x/p", "name": "First"}));
        index.insert(json!({"resourceType": "StructureDefinition", "id": "b", "url": "http://x/p", "name": "Second"}));

        assert_eq!(index.find("http://x/p").unwrap()["name"], "First");
        assert_eq!(index.find("StructureDefinition/b").unwrap()["name"], "Second");
    }

    #[test]
    fn test_resources_without_keys_are_ignored() {
        let mut index = DefinitionIndex::new();
        index.insert(json!({"text": "no identity"}));
        assert!(index.is_empty());
    }

    #[test]
    fn test_from_packages_skips_broken_definitions() {
        let temp = create_temp_dir();
        let root = CachedPackage::new("a", "1.0.0")
            .definition("good", Some("http://hl7.org/fhir/StructureDefinition/Patient"), false)
            .file(
                "package",
                "StructureDefinition-broken.json",
                r#"{"resourceType":"StructureDefinition", "url": "#,
            )
            .write(temp.path());
        let package = ResolvedPackage::load_from_dir(&root).unwrap();

        let index = DefinitionIndex::from_packages(&[package]);
        assert_eq!(index.len(), 1);
        assert!(index.find("http://example.org/StructureDefinition/good").is_some());
    }

    #[test]
    fn test_layered_source_prefers_primary() {
        let mut local = DefinitionIndex::new();
        local.insert(json!({"resourceType": "StructureDefinition", "id": "p", "url": "http://x/p", "name": "Local"}));
        let mut packages = DefinitionIndex::new();
        packages.insert(json!({"resourceType": "StructureDefinition", "id": "p", "url": "http://x/p", "name": "Package"}));
        packages.insert(json!({"resourceType": "StructureDefinition", "id": "q", "url": "http://x/q", "name": "Other"}));

        let layered = LayeredSource::new(&local, &packages);
        assert_eq!(layered.find("http://x/p").unwrap()["name"], "Local");
        assert_eq!(layered.find("http://x/q").unwrap()["name"], "Other");
        assert!(layered.find("http://x/r").is_none());
    }
}
