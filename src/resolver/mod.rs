//! Dependency resolution
//!
//! Turns the requested coordinates into an ordered list of packages with at
//! most one entry per package name.
//!
//! ## Algorithm
//!
//! 1. Roots are loaded in request order. The first package loaded for a name
//!    wins; a later root with the same name is discarded after it was loaded,
//!    whatever version it asked for.
//! 2. Unless dependencies are skipped, each package in the list, including
//!    the ones appended while walking, has its dependency edges followed
//!    depth-first. An edge whose name was already seen is skipped before any
//!    load or descent, which makes the walk terminate on cyclic graphs.
//!
//! Any load failure aborts resolution; there is no partial result.

use std::collections::HashSet;

use crate::cache::CacheTracker;
use crate::coordinate::PackageCoordinate;
use crate::error::Result;
use crate::package::ResolvedPackage;

/// Something packages can be loaded from
pub trait PackageSource {
    /// Load a package by name, pinned to a version when the coordinate has one
    fn load(&self, coordinate: &PackageCoordinate) -> Result<ResolvedPackage>;
}

/// Resolved packages plus the names already claimed
#[derive(Debug, Default)]
pub struct DependencySet {
    packages: Vec<ResolvedPackage>,
    seen: HashSet<String>,
}

impl DependencySet {
    /// Claim a name; returns false when it was already seen
    fn claim(&mut self, name: &str) -> bool {
        self.seen.insert(name.to_string())
    }

    pub fn into_packages(self) -> Vec<ResolvedPackage> {
        self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Walks the dependency graph of the requested packages
pub struct Resolver<'a, S: PackageSource> {
    source: &'a S,
    tracker: &'a mut CacheTracker,
    skip_deps: bool,
    set: DependencySet,
}

impl<'a, S: PackageSource> Resolver<'a, S> {
    pub fn new(source: &'a S, tracker: &'a mut CacheTracker, skip_deps: bool) -> Self {
        Self {
            source,
            tracker,
            skip_deps,
            set: DependencySet::default(),
        }
    }

    /// Resolve the requested coordinates and, unless skipped, their dependencies
    pub fn resolve(mut self, requested: &[PackageCoordinate]) -> Result<DependencySet> {
        for coordinate in requested {
            let package = self.load(coordinate)?;
            if self.set.claim(&package.name) {
                tracing::debug!("resolved root {}", package.folder_name());
                self.set.packages.push(package);
            } else {
                tracing::debug!(
                    "discarding {}: {} already resolved",
                    package.folder_name(),
                    package.name
                );
            }
        }

        if !self.skip_deps {
            let mut index = 0;
            while index < self.set.packages.len() {
                let edges = self.set.packages[index].dependencies.clone();
                self.walk(&edges)?;
                index += 1;
            }
        }

        Ok(self.set)
    }

    /// Depth-first walk over dependency edges
    fn walk(&mut self, edges: &[PackageCoordinate]) -> Result<()> {
        for edge in edges {
            if !self.set.claim(&edge.name) {
                continue;
            }

            let package = self.load(edge)?;
            tracing::debug!("resolved dependency {}", package.folder_name());
            let nested = package.dependencies.clone();
            self.set.packages.push(package);
            self.walk(&nested)?;
        }
        Ok(())
    }

    fn load(&mut self, coordinate: &PackageCoordinate) -> Result<ResolvedPackage> {
        let package = self.source.load(coordinate)?;
        self.tracker.observe(&package.path);
        Ok(package)
    }
}
