//! Configuration loader describing where packaged assets come from and where they go.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use same_file::is_same_file;
use serde::Deserialize;

use crate::error::{SyncError, SyncResult};

/// File name searched for by [`SyncConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "asset_sync.config.json";

/// Discoverable configuration for filesystem-backed sync sessions.
///
/// Relative paths are resolved against the directory the configuration was discovered in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root directory of the read-only package tree.
    pub package_root: String,
    /// Default destination folder for installed copies.
    pub destination_dir: String,
    /// JSON document remembering installed versions.
    pub version_store_file: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            package_root: "assets".into(),
            destination_dir: "files".into(),
            version_store_file: "asset_versions.json".into(),
        }
    }
}

impl SyncConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// When the configuration file does not exist or fails to parse we fall back to default
    /// values so callers can keep working with the conventional layout.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Package root resolved against `base_dir`.
    pub fn package_root_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.package_root)
    }

    /// Destination folder resolved against `base_dir`.
    pub fn destination_dir_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.destination_dir)
    }

    /// Version store document resolved against `base_dir`.
    pub fn version_store_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.version_store_file)
    }

    /// Reject layouts that would install copies on top of the package itself.
    pub fn validate(&self, base_dir: &Path) -> SyncResult<()> {
        if self.destination_dir.is_empty() {
            return Err(SyncError::invalid("the destination directory is empty"));
        }

        let package_root = self.package_root_path(base_dir);
        let destination = self.destination_dir_path(base_dir);
        match is_same_file(&package_root, &destination) {
            Ok(true) => Err(SyncError::invalid(format!(
                "destination {} is the package root",
                destination.display()
            ))),
            Ok(false) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SyncError::invalid(format!(
                "can not compare {} with {}: {}",
                package_root.display(),
                destination.display(),
                err
            ))),
        }
    }
}
