//! Cache location tracking
//!
//! Remembers which package directories exist in the cache. The known set is
//! seeded from the cache root once at startup; every package directory the
//! run touches afterwards is reported the first time it is seen.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::path_utils::normalize;

/// Known physical cache directories
#[derive(Debug, Default)]
pub struct CacheTracker {
    known: HashSet<PathBuf>,
    discovered: Vec<PathBuf>,
}

impl CacheTracker {
    /// Seed the known set with the top-level directories of `cache_root`
    ///
    /// A missing or unreadable cache root seeds nothing.
    pub fn seed(cache_root: &Path) -> Self {
        let mut known = HashSet::new();

        if let Ok(entries) = fs::read_dir(cache_root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    known.insert(normalize(&path));
                }
            }
        }

        tracing::debug!(
            "cache {} holds {} package directories",
            cache_root.display(),
            known.len()
        );

        Self {
            known,
            discovered: Vec::new(),
        }
    }

    /// Record a resolved package location
    ///
    /// Returns true and logs a discovery only the first time a path is seen.
    pub fn observe(&mut self, path: &Path) -> bool {
        let path = normalize(path);
        if self.known.contains(&path) {
            return false;
        }

        tracing::info!("discovered cache location {}", path.display());
        self.known.insert(path.clone());
        self.discovered.push(path);
        true
    }

    /// Locations discovered during this run, in discovery order
    pub fn discovered(&self) -> &[PathBuf] {
        &self.discovered
    }
}
