//! FHIR package registry client
//!
//! Speaks the NPM-style protocol served by `packages.fhir.org` and
//! `packages2.fhir.org`:
//!
//! - `GET <registry>/<name>` returns package metadata with `dist-tags`
//! - `GET <registry>/<name>/<version>` returns the package tarball
//!
//! Tarballs are gzip-compressed tar archives whose entries live under
//! `package/`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tar::Archive;

use crate::error::{Result, extraction_failed, package_not_found, registry_request_failed};

/// Package metadata document
#[derive(Debug, Deserialize)]
pub struct PackageMetadata {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,

    #[serde(default)]
    pub versions: BTreeMap<String, serde_json::Value>,
}

impl PackageMetadata {
    /// Version tagged `latest`, or the highest listed version
    pub fn latest(&self) -> Option<String> {
        if let Some(latest) = self.dist_tags.get("latest") {
            return Some(latest.clone());
        }
        crate::cache::highest_version(self.versions.keys().map(String::as_str))
    }
}

/// Blocking registry client
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("fhirpkg/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch package metadata
    pub fn metadata(&self, name: &str) -> Result<PackageMetadata> {
        let url = format!("{}/{}", self.base_url, name);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(package_not_found(name, None));
        }
        if !response.status().is_success() {
            return Err(registry_request_failed(
                url,
                format!("registry returned status {}", response.status()),
            ));
        }

        response
            .json::<PackageMetadata>()
            .map_err(|e| registry_request_failed(url, e.to_string()))
    }

    /// Resolve the latest published version of a package
    pub fn latest_version(&self, name: &str) -> Result<String> {
        self.metadata(name)?
            .latest()
            .ok_or_else(|| package_not_found(name, None))
    }

    /// Download a package tarball
    pub fn download(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}/{}", self.base_url, name, version);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(package_not_found(name, Some(version)));
        }
        if !response.status().is_success() {
            return Err(registry_request_failed(
                url,
                format!("download failed with status {}", response.status()),
            ));
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Extract a package tarball into `target_dir`
pub fn unpack_archive(name: &str, archive_bytes: &[u8], target_dir: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(archive_bytes));
    archive
        .unpack(target_dir)
        .map_err(|e| extraction_failed(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{StubRegistry, create_temp_dir, package_tarball};

    #[test]
    fn test_metadata_latest_from_dist_tags() {
        let metadata: PackageMetadata = serde_json::from_str(
            r#"{"name":"hl7.fhir.us.core","dist-tags":{"latest":"6.1.0"},
                "versions":{"3.1.1":{},"6.1.0":{},"7.0.0-ballot":{}}}"#,
        )
        .unwrap();
        assert_eq!(metadata.latest().as_deref(), Some("6.1.0"));
    }

    #[test]
    fn test_metadata_latest_without_dist_tags() {
        let metadata: PackageMetadata =
            serde_json::from_str(r#"{"name":"a","versions":{"1.2.0":{},"1.10.0":{},"1.9.1":{}}}"#)
                .unwrap();
        assert_eq!(metadata.latest().as_deref(), Some("1.10.0"));
    }

    #[test]
    fn test_metadata_latest_empty() {
        let metadata: PackageMetadata = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
        assert_eq!(metadata.latest(), None);
    }

    #[test]
    fn test_client_against_registry_with_trailing_slash() {
        let registry = StubRegistry::serve(vec![
            ("/a", br#"{"dist-tags":{"latest":"1.1.0"}}"#.to_vec()),
            ("/a/1.1.0", b"tarball".to_vec()),
        ]);
        assert!(registry.url().ends_with('/'));
        let client = RegistryClient::new(registry.url()).unwrap();

        assert_eq!(client.latest_version("a").unwrap(), "1.1.0");
        assert_eq!(client.download("a", "1.1.0").unwrap(), b"tarball");
    }

    #[test]
    fn test_unknown_package_is_not_found() {
        let registry = StubRegistry::serve(Vec::new());
        let client = RegistryClient::new(registry.url()).unwrap();

        let err = client.latest_version("missing").unwrap_err();
        assert!(matches!(err, crate::error::FhirPkgError::PackageNotFound { .. }));
        let err = client.download("missing", "1.0.0").unwrap_err();
        assert!(matches!(err, crate::error::FhirPkgError::PackageNotFound { .. }));
    }

    #[test]
    fn test_unreachable_registry_fails() {
        let client = RegistryClient::new("http://127.0.0.1:9").unwrap();
        let err = client.latest_version("hl7.fhir.r4.core").unwrap_err();
        assert!(err.to_string().contains("Registry request failed"));
    }

    #[test]
    fn test_unpack_archive() {
        let temp = create_temp_dir();
        let bytes = package_tarball(&[
            ("package/package.json", r#"{"name":"a","version":"1.0.0"}"#),
            ("package/example/x.json", "{}"),
        ]);

        unpack_archive("a", &bytes, temp.path()).unwrap();
        assert!(temp.path().join("package/package.json").is_file());
        assert!(temp.path().join("package/example/x.json").is_file());
    }

    #[test]
    fn test_unpack_corrupt_archive() {
        let temp = create_temp_dir();
        let err = unpack_archive("a", b"not a tarball", temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to extract"));
    }
}
