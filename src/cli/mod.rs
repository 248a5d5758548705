//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::run::DEFAULT_REGISTRY;

/// fhirpkg - FHIR package snapshot tool
///
/// Downloads FHIR NPM packages, resolves their dependencies, generates
/// StructureDefinition snapshots and writes them as JSON files.
#[derive(Parser, Debug)]
#[command(
    name = "fhirpkg",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Resolve FHIR packages and generate StructureDefinition snapshots",
    after_help = "EXAMPLES:\n  \
                  Snapshot a package and its dependencies:\n    \
                  fhirpkg -p hl7.fhir.us.core@6.1.0 -o out\n\n\
                  Read dependencies from a SUSHI config:\n    \
                  fhirpkg --sushi-deps-file sushi-config.yaml\n\n\
                  Snapshot local profiles against their dependencies:\n    \
                  fhirpkg --sushi-deps-file sushi-config.yaml --profiles-dir fsh-generated/resources"
)]
pub struct Cli {
    /// FHIR NPM packages (repeatable or comma-separated, e.g. hl7.fhir.r4.core@4.0.1,hl7.fhir.us.core@6.1.0)
    #[arg(short = 'p', long = "package", value_name = "COORDINATE")]
    pub packages: Vec<String>,

    /// Path to sushi-config.yaml (or any YAML file with a 'dependencies:' block)
    #[arg(long, value_name = "FILE")]
    pub sushi_deps_file: Option<PathBuf>,

    /// YAML text with a 'dependencies:' block
    #[arg(long, value_name = "YAML")]
    pub sushi_deps_str: Option<String>,

    /// Output directory for StructureDefinitions
    #[arg(short = 'o', long, value_name = "DIR", env = "FHIRPKG_OUT")]
    pub out: Option<PathBuf>,

    /// Local cache folder for FHIR packages
    #[arg(long, value_name = "DIR", env = "FHIRPKG_CACHE")]
    pub cache: Option<PathBuf>,

    /// Package registry
    #[arg(long, value_name = "URL", env = "FHIRPKG_REGISTRY", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Do not load dependencies of the requested packages
    #[arg(long)]
    pub skip_deps: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub overwrite: bool,

    /// Pretty-print generated JSON (use --pretty false for compact output)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub pretty: bool,

    /// Always (re)generate snapshots, even if present
    #[arg(long)]
    pub force_snapshot: bool,

    /// Directory with local StructureDefinition JSON files (processed recursively)
    #[arg(long, value_name = "DIR")]
    pub profiles_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
