//! Test fixtures shared by unit tests
//!
//! ```ignore
//! use crate::test_fixtures::{CachedPackage, create_temp_dir};
//!
//! let temp = create_temp_dir();
//! let root = CachedPackage::new("hl7.fhir.us.core", "6.1.0")
//!     .fhir_version("4.0.1")
//!     .dependency("hl7.fhir.r4.core", "4.0.1")
//!     .definition("us-core-patient", Some(PATIENT), false)
//!     .write(temp.path());
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use crate::error::{Result, generation_failed};
use crate::snapshot::{DefinitionSource, SnapshotGenerator};

/// Create a temp directory that is removed on drop
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// StructureDefinition JSON with canonical URL `http://example.org/StructureDefinition/<id>`
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
            {"id": "Patient.name", "path": "Patient.name", "min": 1}
        ]});
    }
    serde_json::to_string_pretty(&sd).expect("fixture serializes")
}

/// Builder for a package in the on-disk cache layout
pub struct CachedPackage {
    name: String,
    version: String,
    fhir_versions: Vec<String>,
    dependencies: Map<String, Value>,
    files: Vec<(String, String, String)>,
}

impl CachedPackage {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            fhir_versions: Vec::new(),
            dependencies: Map::new(),
            files: Vec::new(),
        }
    }

    pub fn fhir_version(mut self, version: &str) -> Self {
        self.fhir_versions.push(version.to_string());
        self
    }

    /// Add a dependency edge; an empty version declares a bare name
    pub fn dependency(mut self, name: &str, version: &str) -> Self {
        self.dependencies
            .insert(name.to_string(), Value::String(version.to_string()));
        self
    }

    /// Add `package/StructureDefinition-<id>.json`
    pub fn definition(self, id: &str, base: Option<&str>, with_snapshot: bool) -> Self {
        let content = structure_definition(id, base, with_snapshot);
        self.file("package", &format!("StructureDefinition-{id}.json"), &content)
    }

    /// Add a file under a folder key such as `package/example`
    pub fn file(mut self, folder: &str, name: &str, content: &str) -> Self {
        self.files
            .push((folder.to_string(), name.to_string(), content.to_string()));
        self
    }

    /// Write the package under `cache_root`, returning its root directory
    ///
    /// # Panics
    ///
    /// Panics if the files cannot be written.
    pub fn write(&self, cache_root: &Path) -> PathBuf {
        let root = cache_root.join(format!("{}#{}", self.name, self.version));
        let package_dir = root.join("package");
        fs::create_dir_all(&package_dir).expect("Failed to create package dir");

        let manifest = json!({
            "name": self.name,
            "version": self.version,
            "fhirVersions": self.fhir_versions,
            "dependencies": self.dependencies,
        });
        fs::write(
            package_dir.join("package.json"),
            serde_json::to_string_pretty(&manifest).expect("fixture serializes"),
        )
        .expect("Failed to write package.json");

        for (folder, name, content) in &self.files {
            let dir = folder.split('/').fold(root.clone(), |acc, part| acc.join(part));
            fs::create_dir_all(&dir).expect("Failed to create folder");
            fs::write(dir.join(name), content).expect("Failed to write file");
        }
        root
    }
}

/// Gzipped tarball holding the given `(path, content)` entries
///
/// # Panics
///
/// Panics if the archive cannot be built.
pub fn package_tarball(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .expect("Failed to append entry");
    }
    builder
        .into_inner()
        .and_then(flate2::write::GzEncoder::finish)
        .expect("Failed to finish archive")
}

/// Package registry on a local port answering fixed paths
///
/// Paths without a route get a 404. Each connection carries one request.
pub struct StubRegistry {
    url: String,
}

impl StubRegistry {
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub fn serve(routes: Vec<(&str, Vec<u8>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub registry");
        let url = format!("http://{}/", listener.local_addr().expect("bound address"));
        let routes: HashMap<String, Vec<u8>> = routes
            .into_iter()
            .map(|(path, body)| (path.to_string(), body))
            .collect();

        std::thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                respond(&stream, &routes);
            }
        });
        Self { url }
    }

    /// Base URL with a trailing slash
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn respond(stream: &TcpStream, routes: &HashMap<String, Vec<u8>>) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut header = String::new();
    while reader.read_line(&mut header).is_ok_and(|n| n > 2) {
        header.clear();
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = match routes.get(path) {
        Some(body) => ("200 OK", body.as_slice()),
        None => ("404 Not Found", &[][..]),
    };
    let mut writer = stream;
    let _ = write!(
        writer,
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = writer.write_all(body);
    let _ = writer.flush();
}

/// Generator that stamps a fixed snapshot and records the `(url, name)`
/// pairs it was called with
#[derive(Default)]
pub struct StubGenerator {
    pub calls: RefCell<Vec<(String, String)>>,
}

impl SnapshotGenerator for StubGenerator {
    fn generate_snapshot(
        &self,
        resource: &Value,
        _context: &dyn DefinitionSource,
        url: &str,
        name: &str,
    ) -> Result<Value> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), name.to_string()));
        let mut generated = resource.clone();
        generated["snapshot"] = json!({"element": [{"id": "stub"}]});
        Ok(generated)
    }
}

/// Generator that always fails
pub struct FailingGenerator;

impl SnapshotGenerator for FailingGenerator {
    fn generate_snapshot(
        &self,
        _resource: &Value,
        _context: &dyn DefinitionSource,
        url: &str,
        _name: &str,
    ) -> Result<Value> {
        Err(generation_failed(url, "stub failure"))
    }
}
