//! Resolved FHIR packages
//!
//! A package on disk looks like:
//!
//! ```text
//! <cache>/hl7.fhir.us.core#6.1.0/
//! └── package/
//!     ├── package.json
//!     ├── .index.json
//!     ├── StructureDefinition-us-core-patient.json
//!     ├── example/
//!     │   └── Patient-example.json
//!     └── other/
//!         └── spec.internals
//! ```
//!
//! Every directory holding files is a category (folder), keyed by its path
//! relative to the package root: `package`, `package/example`, `package/other`.

pub mod manifest;

pub use manifest::PackageManifest;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::coordinate::PackageCoordinate;
use crate::error::fs::read_error;
use crate::error::{Result, file_not_found, package_manifest_invalid};
use crate::resource::{ResourceHeader, STRUCTURE_DEFINITION};

/// Folder holding the manifest and the conformance resources
pub const PACKAGE_FOLDER: &str = "package";

const MANIFEST_FILE: &str = "package.json";
const INDEX_FILE: &str = ".index.json";

/// A loaded package; immutable once loaded
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,

    /// Package root in the cache (`<cache>/<name>#<version>`)
    pub path: PathBuf,

    /// Declared FHIR version
    pub fhir_version: Option<String>,

    /// Dependency edges in declaration order
    pub dependencies: Vec<PackageCoordinate>,

    /// Folder key -> file names, both sorted
    folders: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PackageIndex {
    #[serde(default)]
    files: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    filename: String,
    resource_type: Option<String>,
}

impl ResolvedPackage {
    /// Load a package from its root directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let manifest_path = path.join(PACKAGE_FOLDER).join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(package_manifest_invalid(
                path.display().to_string(),
                "missing package/package.json",
            ));
        }
        let manifest = PackageManifest::from_file(&manifest_path)?;

        Ok(Self {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            path: path.to_path_buf(),
            fhir_version: manifest.fhir_version(),
            dependencies: manifest.dependency_edges(),
            folders: scan_folders(path),
        })
    }

    /// Output and cache folder name, `<name>#<version>`
    pub fn folder_name(&self) -> String {
        format!("{}#{}", self.name, self.version)
    }

    /// Categorized folders with their file names
    pub fn folders(&self) -> &BTreeMap<String, Vec<String>> {
        &self.folders
    }

    /// Files in one folder
    pub fn list(&self, folder: &str) -> &[String] {
        self.folders.get(folder).map_or(&[], Vec::as_slice)
    }

    /// Read a contained file's bytes
    pub fn read(&self, folder: &str, file: &str) -> Result<Vec<u8>> {
        let path = self.file_path(folder, file);
        if !path.is_file() {
            return Err(file_not_found(path.display().to_string()));
        }
        std::fs::read(&path).map_err(|e| read_error(&path, &e))
    }

    /// Read a contained file as UTF-8 text
    pub fn read_to_string(&self, folder: &str, file: &str) -> Result<String> {
        let path = self.file_path(folder, file);
        std::fs::read_to_string(&path).map_err(|e| read_error(&path, &e))
    }

    fn file_path(&self, folder: &str, file: &str) -> PathBuf {
        folder
            .split('/')
            .fold(self.path.clone(), |acc, part| acc.join(part))
            .join(file)
    }

    /// File names of the StructureDefinitions in the `package` folder
    ///
    /// Uses `.index.json` when the package ships one, otherwise peeks at
    /// every JSON file.
    pub fn structure_definitions(&self) -> Vec<String> {
        if let Some(listed) = self.definitions_from_index() {
            return listed;
        }

        self.list(PACKAGE_FOLDER)
            .iter()
            .filter(|file| is_resource_file(file))
            .filter(|file| {
                self.read_to_string(PACKAGE_FOLDER, file)
                    .ok()
                    .and_then(|json| ResourceHeader::peek(&json).ok())
                    .is_some_and(|header| header.is_structure_definition())
            })
            .cloned()
            .collect()
    }

    fn definitions_from_index(&self) -> Option<Vec<String>> {
        let json = self.read_to_string(PACKAGE_FOLDER, INDEX_FILE).ok()?;
        let index: PackageIndex = match serde_json::from_str(&json) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("ignoring unreadable {} in {}: {}", INDEX_FILE, self.folder_name(), e);
                return None;
            }
        };

        let mut files: Vec<String> = index
            .files
            .into_iter()
            .filter(|entry| entry.resource_type.as_deref() == Some(STRUCTURE_DEFINITION))
            .map(|entry| entry.filename)
            .filter(|file| self.list(PACKAGE_FOLDER).contains(file))
            .collect();
        files.sort();
        Some(files)
    }
}

fn is_resource_file(file: &str) -> bool {
    file.to_ascii_lowercase().ends_with(".json") && !file.starts_with('.') && file != MANIFEST_FILE
}

fn scan_folders(root: &Path) -> BTreeMap<String, Vec<String>> {
    let mut folders: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Some(parent) = entry.path().parent() else {
            continue;
        };
        let Ok(relative) = parent.strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let file = entry.file_name().to_string_lossy().into_owned();
        folders.entry(key).or_default().push(file);
    }

    for files in folders.values_mut() {
        files.sort();
    }
    folders
}
