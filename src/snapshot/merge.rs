//! Built-in snapshot generator
//!
//! Builds a snapshot by overlaying a profile's differential on the snapshot
//! of its `baseDefinition`:
//!
//! - Elements are matched by `id`, or by `path` when an element has no id.
//! - A matched differential element overrides the base element's fields.
//! - An unmatched element is inserted after the last descendant of its
//!   parent (`Patient.identifier:mrn` goes after `Patient.identifier` and its
//!   children), or appended when the parent is unknown.
//!
//! A base that only carries a differential gets its own snapshot generated
//! first. A definition without a `baseDefinition` uses its differential as
//! its snapshot.

use std::collections::HashSet;

use serde_json::{Map, Value, json};

use crate::context::FhirRelease;
use crate::error::{Result, base_not_found, generation_failed};
use crate::resource::str_field;

use super::{DefinitionSource, SnapshotGenerator};

/// Snapshot generator that merges differentials onto base snapshots
#[derive(Debug, Clone, Copy)]
pub struct DifferentialMerger {
    release: FhirRelease,
}

impl DifferentialMerger {
    pub fn new(release: FhirRelease) -> Self {
        Self { release }
    }

    fn generate(
        &self,
        resource: &Value,
        context: &dyn DefinitionSource,
        label: &str,
        chain: &mut HashSet<String>,
    ) -> Result<Value> {
        if !chain.insert(label.to_string()) {
            return Err(generation_failed(label, "circular baseDefinition chain"));
        }

        let differential = elements(resource, "differential");
        let snapshot = match str_field(resource, "baseDefinition").filter(|b| !b.is_empty()) {
            None => differential,
            Some(base_url) => {
                let base = context
                    .find(base_url)
                    .ok_or_else(|| base_not_found(label, base_url))?;
                let mut merged = self.base_snapshot(base, base_url, context, chain)?;
                for element in differential {
                    overlay(&mut merged, element);
                }
                merged
            }
        };

        let Value::Object(fields) = resource else {
            return Err(generation_failed(label, "resource is not a JSON object"));
        };
        let mut generated = fields.clone();
        generated.insert("snapshot".to_string(), json!({ "element": snapshot }));
        if !generated.contains_key("fhirVersion") {
            generated.insert(
                "fhirVersion".to_string(),
                Value::String(self.release.fhir_version().to_string()),
            );
        }
        Ok(Value::Object(generated))
    }

    fn base_snapshot(
        &self,
        base: &Value,
        base_url: &str,
        context: &dyn DefinitionSource,
        chain: &mut HashSet<String>,
    ) -> Result<Vec<Value>> {
        if base.get("snapshot").is_some() {
            return Ok(elements(base, "snapshot"));
        }

        tracing::debug!("generating snapshot of base {}", base_url);
        let generated = self.generate(base, context, base_url, chain)?;
        Ok(elements(&generated, "snapshot"))
    }
}

impl SnapshotGenerator for DifferentialMerger {
    fn generate_snapshot(
        &self,
        resource: &Value,
        context: &dyn DefinitionSource,
        url: &str,
        name: &str,
    ) -> Result<Value> {
        let label = if url.is_empty() { name } else { url };
        let mut chain = HashSet::new();
        self.generate(resource, context, label, &mut chain)
    }
}

fn elements(resource: &Value, section: &str) -> Vec<Value> {
    resource
        .get(section)
        .and_then(|s| s.get("element"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn element_key(element: &Value) -> Option<&str> {
    str_field(element, "id").or_else(|| str_field(element, "path"))
}

/// Parent key of an element id: the sliced element for a slice, otherwise
/// the id without its last path segment
fn parent_key(key: &str) -> Option<&str> {
    let segment_start = key.rfind('.').map_or(0, |i| i + 1);
    let segment = &key[segment_start..];
    if let Some(colon) = segment.rfind(':') {
        return Some(&key[..segment_start + colon]);
    }
    key.rfind('.').map(|i| &key[..i])
}

fn is_within(key: &str, ancestor: &str) -> bool {
    key == ancestor
        || key
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('.') || rest.starts_with(':'))
}

fn overlay(snapshot: &mut Vec<Value>, element: Value) {
    let Some(key) = element_key(&element).map(ToString::to_string) else {
        return;
    };

    if let Some(existing) = snapshot
        .iter_mut()
        .find(|e| element_key(e) == Some(key.as_str()))
    {
        if let (Value::Object(target), Value::Object(source)) = (existing, element) {
            merge_fields(target, source);
        }
        return;
    }

    let insert_at = parent_key(&key)
        .and_then(|parent| {
            let start = snapshot
                .iter()
                .position(|e| element_key(e) == Some(parent))?;
            let end = snapshot[start..]
                .iter()
                .take_while(|e| element_key(e).is_some_and(|k| is_within(k, parent)))
                .count();
            Some(start + end)
        })
        .unwrap_or(snapshot.len());
    snapshot.insert(insert_at, element);
}

fn merge_fields(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (field, value) in source {
        if field == "id" && target.contains_key("id") {
            continue;
        }
        target.insert(field, value);
    }
}
