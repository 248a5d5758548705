//! Local profiles reconciliation
//!
//! Processes a directory of StructureDefinition JSON files in two passes:
//!
//! 1. Index: every parseable JSON resource goes into a local index so local
//!    profiles can resolve each other (base profiles, value sets).
//! 2. Generate: every StructureDefinition is regenerated when needed against
//!    the local index, then the package definitions, and written to
//!    `<out>/local/<relative path>`.
//!
//! Failures are per file: the file is logged and skipped, the run goes on.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::config::RunConfig;
use crate::error::Result;
use crate::error::generation::parse_failed;
use crate::path_utils::normalize;
use crate::resource::{ResourceHeader, to_json};
use crate::snapshot::{DefinitionIndex, DefinitionSource, LayeredSource, SnapshotGenerator};

use super::{OutputArtifact, ReconcileStats, needs_regeneration, persist};

pub struct LocalReconciler<'a> {
    config: &'a RunConfig,
    generator: &'a dyn SnapshotGenerator,
    packages: &'a dyn DefinitionSource,
}

impl<'a> LocalReconciler<'a> {
    pub fn new(
        config: &'a RunConfig,
        generator: &'a dyn SnapshotGenerator,
        packages: &'a dyn DefinitionSource,
    ) -> Self {
        Self {
            config,
            generator,
            packages,
        }
    }

    /// Reconcile the profiles under `profiles_dir`
    pub fn reconcile(&self, profiles_dir: &Path) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        if !profiles_dir.is_dir() {
            tracing::warn!(
                "profiles directory not found or not a directory: {}",
                profiles_dir.display()
            );
            return stats;
        }

        let local_index = self.index_pass(profiles_dir);
        let context = LayeredSource::new(&local_index, self.packages);
        let out_root = self.config.local_out_dir();

        for path in self.json_files(profiles_dir) {
            if let Err(e) = self.process(&path, profiles_dir, &out_root, &context, &mut stats) {
                tracing::warn!("skipping {}: {}", path.display(), e);
            }
        }
        stats
    }

    fn index_pass(&self, profiles_dir: &Path) -> DefinitionIndex {
        let mut index = DefinitionIndex::new();
        for path in self.json_files(profiles_dir) {
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| serde_json::from_str::<Value>(&json).map_err(|e| e.to_string()));
            match parsed {
                Ok(resource @ Value::Object(_)) => index.insert(resource),
                Ok(_) => tracing::warn!("not a FHIR resource: {}", path.display()),
                Err(e) => tracing::warn!("cannot index {}: {}", path.display(), e),
            }
        }
        if index.is_empty() {
            tracing::warn!("no resources indexed in {}", profiles_dir.display());
        } else {
            tracing::debug!("indexed {} local resources", index.len());
        }
        index
    }

    fn process(
        &self,
        path: &Path,
        profiles_dir: &Path,
        out_root: &Path,
        context: &dyn DefinitionSource,
        stats: &mut ReconcileStats,
    ) -> Result<()> {
        let origin = path.display().to_string();
        let json = fs::read_to_string(path)
            .map_err(|e| crate::error::file_read_failed(&origin, e.to_string()))?;
        let header = ResourceHeader::peek(&json).map_err(|e| parse_failed(&origin, e.to_string()))?;
        if !header.is_structure_definition() {
            return Ok(());
        }
        stats.definitions += 1;

        let regenerated = needs_regeneration(&header, self.config.force_snapshot);
        let content = if regenerated {
            let resource: Value =
                serde_json::from_str(&json).map_err(|e| parse_failed(&origin, e.to_string()))?;
            let generated = self.generator.generate_snapshot(
                &resource,
                context,
                header.canonical_url(),
                header.display_name(),
            )?;
            stats.generated += 1;
            to_json(&generated, self.config.pretty)?.into_bytes()
        } else {
            json.into_bytes()
        };

        let relative = path.strip_prefix(profiles_dir).unwrap_or(path);
        let artifact = OutputArtifact {
            path: relative.to_path_buf(),
            content,
            regenerated,
        };
        stats.record(persist(out_root, &artifact, self.config.overwrite)?);
        Ok(())
    }

    /// JSON files under `profiles_dir`, sorted, excluding the local output tree
    fn json_files(&self, profiles_dir: &Path) -> Vec<PathBuf> {
        let excluded = normalize(&self.config.local_out_dir());
        WalkDir::new(profiles_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !e.file_type().is_dir() || normalize(e.path()) != excluded)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("cannot walk {}: {}", profiles_dir.display(), e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .to_ascii_lowercase()
                    .ends_with(".json")
            })
            .map(walkdir::DirEntry::into_path)
            .collect()
    }
}
