//! FHIR package cache
//!
//! Packages are cached in the layout shared by the FHIR tooling ecosystem:
//!
//! ```text
//! ~/.fhir/packages/
//! ├── hl7.fhir.r4.core#4.0.1/
//! │   └── package/
//! │       ├── package.json
//! │       └── ...
//! └── hl7.fhir.us.core#6.1.0/
//!     └── package/
//! ```
//!
//! A package missing from the cache is downloaded from the registry,
//! unpacked into a staging directory inside the cache root and renamed into
//! place, so a half-extracted package is never visible under its final name.
//!
//! ## Module Organization
//!
//! - `tracker.rs`: Cache location discovery tracking

pub mod tracker;

pub use tracker::CacheTracker;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::coordinate::PackageCoordinate;
use crate::error::fs::write_error;
use crate::error::{Result, extraction_failed, io_error};
use crate::package::{PACKAGE_FOLDER, ResolvedPackage};
use crate::progress::fetch_spinner;
use crate::registry::{RegistryClient, unpack_archive};
use crate::resolver::PackageSource;

/// Version tag meaning "whatever is newest"
const LATEST_TAG: &str = "latest";

/// Package cache backed by a registry
pub struct PackageCache {
    root: PathBuf,
    registry: RegistryClient,
}

impl PackageCache {
    pub fn new(root: impl Into<PathBuf>, registry: RegistryClient) -> Self {
        Self {
            root: root.into(),
            registry,
        }
    }

    /// Directory of a package version in the cache
    pub fn package_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(format!("{name}#{version}"))
    }

    /// True when a complete package is cached
    pub fn is_cached(&self, name: &str, version: &str) -> bool {
        self.package_dir(name, version)
            .join(PACKAGE_FOLDER)
            .join("package.json")
            .is_file()
    }

    /// Versions of a package present in the cache
    pub fn cached_versions(&self, name: &str) -> Vec<String> {
        let prefix = format!("{name}#");
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut versions: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let folder = entry.file_name().to_string_lossy().into_owned();
                folder.strip_prefix(&prefix).map(ToString::to_string)
            })
            .filter(|version| self.is_cached(name, version))
            .collect();
        versions.sort();
        versions
    }

    /// Pick the version to load for a coordinate
    ///
    /// Versionless requests take the registry's latest version. The highest
    /// cached version stands in only when the registry cannot answer.
    fn resolve_version(&self, coordinate: &PackageCoordinate) -> Result<String> {
        match coordinate.version.as_deref() {
            Some(version) if version != LATEST_TAG => Ok(version.to_string()),
            _ => match self.registry.latest_version(&coordinate.name) {
                Ok(version) => Ok(version),
                Err(e) => {
                    let cached = self.cached_versions(&coordinate.name);
                    let Some(version) = highest_version(cached.iter().map(String::as_str)) else {
                        return Err(e);
                    };
                    tracing::warn!(
                        "latest version of {} unavailable ({}), using cached {}",
                        coordinate.name,
                        e,
                        version
                    );
                    Ok(version)
                }
            },
        }
    }

    /// Download and unpack a package into the cache
    fn install(&self, name: &str, version: &str) -> Result<PathBuf> {
        let target = self.package_dir(name, version);

        let pb = fetch_spinner(format!("{name}#{version}"));
        let downloaded = self.registry.download(name, version);
        pb.finish_and_clear();
        let bytes = downloaded?;

        fs::create_dir_all(&self.root).map_err(|e| write_error(&self.root, &e))?;
        let staging = TempDir::with_prefix_in(".fetch-", &self.root)
            .map_err(|e| io_error(format!("failed to create staging directory: {e}")))?;
        unpack_archive(name, &bytes, staging.path())?;

        if !staging.path().join(PACKAGE_FOLDER).join("package.json").is_file() {
            return Err(extraction_failed(
                name,
                "archive has no package/package.json",
            ));
        }

        if target.exists() {
            fs::remove_dir_all(&target).map_err(|e| write_error(&target, &e))?;
        }
        // The emptied staging guard is dropped without error after the rename
        fs::rename(staging.path(), &target).map_err(|e| write_error(&target, &e))?;

        tracing::info!("cached {}#{} in {}", name, version, target.display());
        Ok(target)
    }
}

impl PackageSource for PackageCache {
    fn load(&self, coordinate: &PackageCoordinate) -> Result<ResolvedPackage> {
        let version = self.resolve_version(coordinate)?;

        let dir = if self.is_cached(&coordinate.name, &version) {
            self.package_dir(&coordinate.name, &version)
        } else {
            self.install(&coordinate.name, &version)?
        };

        let package = ResolvedPackage::load_from_dir(&dir)?;
        if package.name != coordinate.name {
            tracing::warn!(
                "{} declares package name '{}'",
                dir.display(),
                package.name
            );
        }
        Ok(package)
    }
}

/// Highest version by semver order, falling back to string order for
/// versions that are not valid semver
pub fn highest_version<'a>(versions: impl Iterator<Item = &'a str>) -> Option<String> {
    versions.max_by(|a, b| compare_versions(a, b)).map(ToString::to_string)
}

fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Greater,
        (Err(_), Ok(_)) => std::cmp::Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
