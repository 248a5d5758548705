//! Immutable configuration for a single run
//!
//! Built once from the command line and handed to each component.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::Result;

use super::DefaultLocations;

/// Default package registry
pub const DEFAULT_REGISTRY: &str = "https://packages.fhir.org";

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Raw `-p` tokens, possibly comma-separated
    pub packages: Vec<String>,

    /// Dependency document file
    pub sushi_deps_file: Option<PathBuf>,

    /// Inline dependency document
    pub sushi_deps_str: Option<String>,

    /// Output root
    pub out_dir: PathBuf,

    /// Package cache root
    pub cache_dir: PathBuf,

    /// Package registry base URL
    pub registry_url: String,

    /// Load only the requested packages
    pub skip_deps: bool,

    /// Overwrite existing output files
    pub overwrite: bool,

    /// Pretty-print generated JSON
    pub pretty: bool,

    /// Regenerate snapshots even when present
    pub force_snapshot: bool,

    /// Local profiles source directory; switches to local-profiles mode
    pub profiles_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Configuration with default flags for the given directories
    pub fn for_dirs(out_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages: Vec::new(),
            sushi_deps_file: None,
            sushi_deps_str: None,
            out_dir: out_dir.into(),
            cache_dir: cache_dir.into(),
            registry_url: DEFAULT_REGISTRY.to_string(),
            skip_deps: false,
            overwrite: false,
            pretty: true,
            force_snapshot: false,
            profiles_dir: None,
        }
    }

    /// Build the run configuration from parsed arguments
    ///
    /// Default locations are only resolved when a directory was not given.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (out_dir, cache_dir) = match (&cli.out, &cli.cache) {
            (Some(out), Some(cache)) => (out.clone(), cache.clone()),
            (out, cache) => {
                let defaults = DefaultLocations::from_env()?;
                (
                    out.clone().unwrap_or(defaults.out_dir),
                    cache.clone().unwrap_or(defaults.cache_dir),
                )
            }
        };

        Ok(Self {
            packages: cli.packages.clone(),
            sushi_deps_file: cli.sushi_deps_file.clone(),
            sushi_deps_str: cli.sushi_deps_str.clone(),
            registry_url: cli.registry.clone(),
            skip_deps: cli.skip_deps,
            overwrite: cli.overwrite,
            pretty: cli.pretty,
            force_snapshot: cli.force_snapshot,
            profiles_dir: cli.profiles_dir.clone(),
            ..Self::for_dirs(out_dir, cache_dir)
        })
    }

    /// Output subtree for local-profiles mode
    pub fn local_out_dir(&self) -> PathBuf {
        self.out_dir.join("local")
    }
}
