//! FHIR resource helpers
//!
//! A [`ResourceHeader`] is a cheap structural peek at the few top-level fields
//! needed before a resource is confirmed to need processing: its type, its
//! canonical URL, its display name, and whether it already carries a snapshot.
//! Anything that ends up in a written artifact goes through a full parse.

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::error::Result;
use crate::error::generation::parse_failed;

/// Resource type of the definitions this tool regenerates
pub const STRUCTURE_DEFINITION: &str = "StructureDefinition";

/// Display name used when a definition declares none
pub const DEFAULT_DISPLAY_NAME: &str = "StructureDefinition";

/// Top-level fields of a FHIR JSON resource
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHeader {
    pub resource_type: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
    snapshot: Option<IgnoredAny>,
}

impl ResourceHeader {
    /// Peek at a resource's header fields
    pub fn peek(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| parse_failed("<resource>", e.to_string()))
    }

    pub fn is_structure_definition(&self) -> bool {
        self.resource_type.as_deref() == Some(STRUCTURE_DEFINITION)
    }

    /// True when the resource already embeds a generated snapshot
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Canonical URL, empty when undeclared
    pub fn canonical_url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    /// Display name, falling back to the resource type name
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME)
    }
}

/// Serialize a resource for output
pub fn to_json(resource: &Value, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(resource)?
    } else {
        serde_json::to_string(resource)?
    };
    Ok(json)
}

/// Read a string field from a parsed resource
pub fn str_field<'a>(resource: &'a Value, field: &str) -> Option<&'a str> {
    resource.get(field).and_then(Value::as_str)
}
