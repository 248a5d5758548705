//! fhirpkg - FHIR package snapshot tool
//!
//! Resolves FHIR NPM packages and their dependencies through the local package
//! cache, generates StructureDefinition snapshots and writes them to an output
//! tree, either per package or mirrored from a directory of local profiles.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod commands;
mod config;
mod context;
mod coordinate;
mod error;
mod package;
mod path_utils;
mod progress;
mod reconciler;
mod registry;
mod resolver;
mod resource;
mod snapshot;

#[cfg(test)]
mod test_fixtures;

use cli::Cli;
use config::RunConfig;
use error::Result;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins; otherwise `--verbose` selects debug output.
fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("fhirpkg=debug")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = RunConfig::from_cli(cli)?;
    commands::snapshot::run(&config)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
