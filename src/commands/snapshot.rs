//! Snapshot command implementation
//!
//! Runs the whole pipeline for one invocation:
//!
//! 1. Collect requested coordinates from `-p` and dependency documents
//! 2. Resolve packages and their dependencies through the cache
//! 3. Select the FHIR release for the run
//! 4. Reconcile output in registry mode or local profiles mode
//! 5. Print a summary

use std::fs;
use std::path::PathBuf;

use console::Style;

use crate::cache::{CacheTracker, PackageCache};
use crate::config::{DependencyDocument, RunConfig};
use crate::context::{self, FhirRelease};
use crate::coordinate::CoordinateCollector;
use crate::error::fs::write_error;
use crate::error::{FhirPkgError, Result};
use crate::reconciler::{LocalReconciler, ReconcileStats, RegistryReconciler};
use crate::registry::RegistryClient;
use crate::resolver::Resolver;
use crate::snapshot::{DefinitionIndex, DifferentialMerger};

/// What a run did, for the summary
#[derive(Debug, Clone)]
pub struct RunReport {
    pub release: FhirRelease,
    pub packages: usize,
    pub registry: ReconcileStats,
    pub local: ReconcileStats,
    pub discovered: usize,
    pub out_dir: PathBuf,
    pub cache_dir: PathBuf,
}

/// Run snapshot command
pub fn run(config: &RunConfig) -> Result<()> {
    let report = execute(config)?;
    print_summary(&report);
    Ok(())
}

/// Run the pipeline without printing
pub fn execute(config: &RunConfig) -> Result<RunReport> {
    let mut collector = CoordinateCollector::new();
    collector.add_tokens(&config.packages)?;
    if let Some(path) = &config.sushi_deps_file {
        collector.add_document(DependencyDocument::from_file(path)?);
    }
    if let Some(yaml) = &config.sushi_deps_str {
        collector.add_document(DependencyDocument::from_yaml(yaml)?);
    }

    if collector.is_empty() && config.profiles_dir.is_none() {
        return Err(FhirPkgError::NoInputs);
    }
    let (requested, hint) = collector.into_parts();
    tracing::debug!("requested {} packages", requested.len());

    fs::create_dir_all(&config.out_dir).map_err(|e| write_error(&config.out_dir, &e))?;
    fs::create_dir_all(&config.cache_dir).map_err(|e| write_error(&config.cache_dir, &e))?;

    let mut tracker = CacheTracker::seed(&config.cache_dir);
    let cache = PackageCache::new(&config.cache_dir, RegistryClient::new(&config.registry_url)?);
    let resolved = Resolver::new(&cache, &mut tracker, config.skip_deps).resolve(&requested)?;

    // Load failures return above, so a non-empty request only reaches this
    // with at least one package.
    if resolved.is_empty() && !requested.is_empty() && config.profiles_dir.is_none() {
        return Err(FhirPkgError::NothingResolved);
    }
    let packages = resolved.into_packages();

    let release = context::select(hint.as_deref(), &packages);
    tracing::info!("processing with FHIR {}", release);

    let generator = DifferentialMerger::new(release);
    let definitions = DefinitionIndex::from_packages(&packages);

    let mut report = RunReport {
        release,
        packages: packages.len(),
        registry: ReconcileStats::default(),
        local: ReconcileStats::default(),
        discovered: tracker.discovered().len(),
        out_dir: absolute(&config.out_dir),
        cache_dir: absolute(&config.cache_dir),
    };

    match &config.profiles_dir {
        None => {
            report.registry =
                RegistryReconciler::new(config, &generator, &definitions).reconcile(&packages)?;
        }
        Some(profiles_dir) => {
            report.local =
                LocalReconciler::new(config, &generator, &definitions).reconcile(profiles_dir);
        }
    }

    Ok(report)
}

fn absolute(path: &std::path::Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Print the run summary
fn print_summary(report: &RunReport) {
    let r = &report.registry;
    let l = &report.local;
    println!(
        "{} {} SDs found, {} snapshots generated, {} SD files written, {} files copied, {} skipped. \
         Local: {} SDs, {} generated, {} written, {} skipped.",
        Style::new().bold().green().apply_to("Done:"),
        r.definitions,
        r.generated,
        r.written,
        r.copied,
        r.skipped,
        l.definitions,
        l.generated,
        l.written,
        l.skipped,
    );
    println!(
        "  {} {} ({} packages)",
        Style::new().bold().apply_to("FHIR:"),
        report.release,
        report.packages
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Output:"),
        report.out_dir.display()
    );
    println!(
        "  {} {} ({} new)",
        Style::new().bold().apply_to("Cache:"),
        report.cache_dir.display(),
        report.discovered
    );
}
