//! Common test utilities for fhirpkg integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Registry address nothing listens on, so tests never reach the network
pub const OFFLINE_REGISTRY: &str = "http://127.0.0.1:9";

/// A temp directory with a package cache and an output directory
#[allow(dead_code)]
pub struct TestWorkspace {
    pub temp: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.path.join("cache")
    }

    pub fn out_dir(&self) -> PathBuf {
        self.path.join("out")
    }

    /// fhirpkg command wired to this workspace's cache and output, offline
    pub fn cmd(&self) -> Command {
        let mut cmd = fhirpkg_cmd();
        cmd.arg("--cache")
            .arg(self.cache_dir())
            .arg("--out")
            .arg(self.out_dir())
            .env("FHIRPKG_REGISTRY", OFFLINE_REGISTRY)
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write a package into the cache as `<name>#<version>/package/...`
    pub fn cache_package(&self, name: &str, version: &str, manifest: Value) -> PathBuf {
        let root = self.cache_dir().join(format!("{name}#{version}"));
        let mut manifest = manifest;
        manifest["name"] = json!(name);
        manifest["version"] = json!(version);
        write(
            &root.join("package/package.json"),
            &serde_json::to_string_pretty(&manifest).expect("manifest serializes"),
        );
        root
    }

    /// Write a file relative to the workspace root
    pub fn write_file(&self, path: &str, content: &str) {
        write(&self.path.join(path), content);
    }

    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Command for the fhirpkg binary
#[allow(deprecated)]
pub fn fhirpkg_cmd() -> Command {
    Command::cargo_bin("fhirpkg").expect("fhirpkg binary is built")
}

/// StructureDefinition JSON with URL `http://example.org/StructureDefinition/<id>`
#[allow(dead_code)]
pub fn structure_definition(id: &str, base: Option<&str>, with_snapshot: bool) -> String {
    let mut sd = json!({
        "resourceType": "StructureDefinition",
        "id": id,
        "url": format!("http://example.org/StructureDefinition/{id}"),
        "name": id,
        "type": "Patient",
        "differential": {"element": [
            {"id": "Patient.name", "path": "Patient.name", "min": 1}
        ]}
    });
    if let Some(base) = base {
        sd["baseDefinition"] = json!(base);
    }
    if with_snapshot {
        sd["snapshot"] = json!({"element": [
            {"id": "Patient", "path": "Patient"},
            {"id": "Patient.name", "path": "Patient.name", "min": 0}
        ]});
    }
    serde_json::to_string_pretty(&sd).expect("definition serializes")
}

/// Create parent directories and write a file
pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_cache_package_layout() {
        let workspace = TestWorkspace::new();
        workspace.cache_package("a", "1.0.0", json!({}));
        assert!(workspace.file_exists("cache/a#1.0.0/package/package.json"));
    }
}
