//! Output reconciliation
//!
//! Writes package contents and StructureDefinitions into the output tree.
//! Two modes exist and exactly one runs per invocation:
//!
//! - Registry mode copies every resolved package to `<out>/<name>#<version>/`
//!   and rewrites its StructureDefinitions with snapshots.
//! - Local mode walks a profiles directory and mirrors its StructureDefinitions
//!   under `<out>/local/`. Package subtrees are not touched.
//!
//! Both modes share one write policy: a regenerated definition is always
//! written, anything else is only written when the target is missing or
//! `--overwrite` is set.
//!
//! ## Module Organization
//!
//! - `registry.rs`: Registry mode
//! - `local.rs`: Local profiles mode

pub mod local;
pub mod registry;

pub use local::LocalReconciler;
pub use registry::RegistryReconciler;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::error::fs::write_error;
use crate::resource::ResourceHeader;

/// Whether a definition's snapshot must be (re)generated
pub fn needs_regeneration(header: &ResourceHeader, force_snapshot: bool) -> bool {
    force_snapshot || !header.has_snapshot()
}

/// A file about to be written to the output tree
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// Path relative to the output root it is written under
    pub path: PathBuf,
    pub content: Vec<u8>,
    /// Generated during this run; bypasses the overwrite check
    pub regenerated: bool,
}

/// Result of persisting one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Skipped,
}

/// Write an artifact under `root` following the overwrite policy
pub fn persist(root: &Path, artifact: &OutputArtifact, overwrite: bool) -> Result<WriteOutcome> {
    let target = root.join(&artifact.path);
    if !artifact.regenerated && !overwrite && target.exists() {
        tracing::debug!("keeping existing {}", target.display());
        return Ok(WriteOutcome::Skipped);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| write_error(parent, &e))?;
    }
    fs::write(&target, &artifact.content).map_err(|e| write_error(&target, &e))?;
    Ok(WriteOutcome::Written)
}

/// Counters reported in the run summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    /// StructureDefinitions seen
    pub definitions: usize,
    /// Snapshots generated
    pub generated: usize,
    /// StructureDefinition files written
    pub written: usize,
    /// Package files copied
    pub copied: usize,
    /// Files left alone because the target already existed
    pub skipped: usize,
}

impl ReconcileStats {
    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Skipped => self.skipped += 1,
        }
    }
}
