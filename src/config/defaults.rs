//! Default cache and output locations
//!
//! The FHIR home directory is chosen from, in order:
//! 1. `APPDATA` -> `<APPDATA>/fhir`
//! 2. `HOME` when running on GitHub Actions -> `$HOME/.fhir`
//! 3. The user's home directory -> `~/.fhir`
//!
//! Packages are cached under `<fhir home>/packages`, output goes to
//! `<fhir home>/snapshots`.

use std::path::PathBuf;

use crate::error::Result;
use crate::error::config::no_default_directory;

const PACKAGES_DIR: &str = "packages";
const SNAPSHOTS_DIR: &str = "snapshots";

/// Default package cache and output directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultLocations {
    pub cache_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl DefaultLocations {
    /// Resolve defaults from the process environment
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Resolve defaults from an environment lookup and a fallback home directory
    pub fn resolve<F>(env: F, user_home: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = fhir_home(&env, user_home).ok_or_else(|| {
            no_default_directory("neither APPDATA, HOME nor a user home directory is available")
        })?;

        Ok(Self {
            cache_dir: root.join(PACKAGES_DIR),
            out_dir: root.join(SNAPSHOTS_DIR),
        })
    }
}

fn fhir_home<F>(env: &F, user_home: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(app_data) = non_blank("APPDATA") {
        return Some(PathBuf::from(app_data).join("fhir"));
    }

    if env("GITHUB_ACTIONS").as_deref() == Some("true") {
        if let Some(home) = non_blank("HOME") {
            return Some(PathBuf::from(home).join(".fhir"));
        }
    }

    user_home.map(|home| home.join(".fhir"))
}
