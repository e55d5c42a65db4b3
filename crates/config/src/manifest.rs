//! Package manifest loading

use crate::constants::PACKAGE_MANIFEST;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use weft_errors::ConfigError;

/// The parts of `package.json` weft reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// The `config` section consulted by the resolver
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl PackageManifest {
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }
}

/// Source of the project manifest
pub trait ManifestLoader: Send + Sync {
    /// Load the manifest of the project rooted at `root_dir`.
    ///
    /// `Ok(None)` means the project has no manifest.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ManifestUnavailable` if the manifest exists but
    /// cannot be read or parsed.
    fn load(&self, root_dir: &Path) -> Result<Option<PackageManifest>, ConfigError>;
}

/// Reads `<root_dir>/package.json` from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestLoader;

impl ManifestLoader for FsManifestLoader {
    fn load(&self, root_dir: &Path) -> Result<Option<PackageManifest>, ConfigError> {
        let path = root_dir.join(PACKAGE_MANIFEST);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::ManifestUnavailable {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| ConfigError::ManifestUnavailable {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}
