//! Registry mode reconciliation
//!
//! For every resolved package:
//!
//! 1. Copy each file of each folder to `<out>/<name>#<version>/<folder>/`,
//!    leaving existing targets alone unless overwriting.
//! 2. Regenerate the snapshot of each StructureDefinition that lacks one
//!    (or all of them when forced) and write it over the copied file.
//!
//! Copy and generation failures abort the run, as does a definition that
//! needs regenerating but does not parse. One that cannot be peeked at is
//! copied as it is unless snapshots are forced.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::RunConfig;
use crate::error::Result;
use crate::error::generation::parse_failed;
use crate::package::{PACKAGE_FOLDER, ResolvedPackage};
use crate::resource::{ResourceHeader, to_json};
use crate::snapshot::{DefinitionSource, SnapshotGenerator};

use super::{OutputArtifact, ReconcileStats, WriteOutcome, needs_regeneration, persist};

pub struct RegistryReconciler<'a> {
    config: &'a RunConfig,
    generator: &'a dyn SnapshotGenerator,
    context: &'a dyn DefinitionSource,
}

impl<'a> RegistryReconciler<'a> {
    pub fn new(
        config: &'a RunConfig,
        generator: &'a dyn SnapshotGenerator,
        context: &'a dyn DefinitionSource,
    ) -> Self {
        Self {
            config,
            generator,
            context,
        }
    }

    pub fn reconcile(&self, packages: &[ResolvedPackage]) -> Result<ReconcileStats> {
        let mut stats = ReconcileStats::default();
        for package in packages {
            let package_out = self.config.out_dir.join(package.folder_name());
            tracing::debug!("writing {} to {}", package.folder_name(), package_out.display());

            self.copy_folders(package, &package_out, &mut stats)?;
            self.write_definitions(package, &package_out, &mut stats)?;
        }
        Ok(stats)
    }

    fn copy_folders(
        &self,
        package: &ResolvedPackage,
        package_out: &Path,
        stats: &mut ReconcileStats,
    ) -> Result<()> {
        for (folder, files) in package.folders() {
            for file in files {
                let artifact = OutputArtifact {
                    path: folder_path(folder).join(file),
                    content: package.read(folder, file)?,
                    regenerated: false,
                };
                match persist(package_out, &artifact, self.config.overwrite)? {
                    WriteOutcome::Written => stats.copied += 1,
                    WriteOutcome::Skipped => stats.skipped += 1,
                }
            }
        }
        Ok(())
    }

    fn write_definitions(
        &self,
        package: &ResolvedPackage,
        package_out: &Path,
        stats: &mut ReconcileStats,
    ) -> Result<()> {
        for file in package.structure_definitions() {
            stats.definitions += 1;

            let json = package.read_to_string(PACKAGE_FOLDER, &file)?;
            let origin = format!("{}/{}/{}", package.folder_name(), PACKAGE_FOLDER, file);
            let header = match ResourceHeader::peek(&json) {
                Ok(header) => Some(header),
                Err(e) => {
                    tracing::warn!("cannot inspect {}: {}", origin, e);
                    None
                }
            };
            let force = self.config.force_snapshot;
            let regenerated = header
                .as_ref()
                .map_or(force, |header| needs_regeneration(header, force));

            let content = if regenerated {
                let resource: Value = serde_json::from_str(&json)
                    .map_err(|e| parse_failed(&origin, e.to_string()))?;
                let header = header.unwrap_or_default();
                let generated = self.generator.generate_snapshot(
                    &resource,
                    self.context,
                    header.canonical_url(),
                    header.display_name(),
                )?;
                stats.generated += 1;
                to_json(&generated, self.config.pretty)?.into_bytes()
            } else {
                json.into_bytes()
            };

            let artifact = OutputArtifact {
                path: Path::new(PACKAGE_FOLDER).join(&file),
                content,
                regenerated,
            };
            stats.record(persist(package_out, &artifact, self.config.overwrite)?);
        }
        Ok(())
    }
}

fn folder_path(folder: &str) -> PathBuf {
    folder.split('/').collect()
}
