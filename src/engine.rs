//! Copy-if-newer state machine for a single resource.

use std::path::Path;

use tracing::{debug, info};

use crate::asset_paths::make_destination_path;
use crate::error::{SyncError, SyncResult};
use crate::locator::AssetLocator;
use crate::models::{ResourceExtension, ResourceRequest, SyncOutcome, SyncStatus};
use crate::package::PackageSource;
use crate::storage::LocalStorage;
use crate::store::VersionStore;

/// A copy is due when nothing is installed yet or the packaged version is strictly newer.
pub fn should_copy(installed: Option<u64>, packaged: u64) -> bool {
  match installed {
    None => true,
    Some(installed) => packaged > installed,
  }
}

/// Status reported after a copy took place.
fn copied_status(installed: Option<u64>) -> SyncStatus {
  match installed {
    None => SyncStatus::Installed,
    Some(_) => SyncStatus::Updated,
  }
}

/// Runs one sync attempt against borrowed collaborators.
///
/// The engine never retries and never caches installed versions; the locator cache is only
/// reused for the lookups made while handling the current request.
pub struct CopyEngine<'a> {
  package: &'a dyn PackageSource,
  store: &'a dyn VersionStore,
  storage: &'a dyn LocalStorage,
  locator: &'a mut AssetLocator,
  default_destination: &'a Path,
}

impl<'a> CopyEngine<'a> {
  /// Create an engine over the given collaborators.
  pub fn new(
    package: &'a dyn PackageSource,
    store: &'a dyn VersionStore,
    storage: &'a dyn LocalStorage,
    locator: &'a mut AssetLocator,
    default_destination: &'a Path,
  ) -> Self {
    Self {
      package,
      store,
      storage,
      locator,
      default_destination,
    }
  }

  /// Install or update the requested resource if the packaged copy is newer.
  pub fn sync(&mut self, request: &ResourceRequest) -> SyncResult<SyncOutcome> {
    request.validate()?;
    let folder = request.source_folder.as_str();
    let name = request.resource_name.as_str();

    let asset = self
      .locator
      .locate(self.package, folder, &request.base_name, &request.extension)?
      .ok_or_else(|| SyncError::not_found(folder, name, "no matching packaged entry"))?;

    let extension = match &request.extension {
      ResourceExtension::Exact(ext) => Some(ext.clone()),
      ResourceExtension::Bare => None,
      ResourceExtension::Discover => {
        let derived = asset
          .extension
          .clone()
          .filter(|ext| !ext.is_empty())
          .ok_or_else(|| {
            SyncError::not_found(
              folder,
              name,
              format!("extension of {} can not be derived", asset.entry_name),
            )
          })?;
        Some(derived)
      }
    };

    let destination_folder = request
      .destination_folder
      .as_deref()
      .unwrap_or(self.default_destination);
    let destination =
      make_destination_path(destination_folder, &request.base_name, extension.as_deref());
    if destination.as_os_str().is_empty() {
      return Err(SyncError::invalid("can not generate destination file path"));
    }

    let installed = self
      .store
      .get(name)
      .map_err(|source| SyncError::VersionStore {
        key: name.to_string(),
        source,
      })?;
    let packaged = asset.extracted_version;

    if !should_copy(installed, packaged) {
      debug!(
        resource = name,
        ?installed,
        packaged,
        "installed version is current, skipping copy"
      );
      return Ok(SyncOutcome {
        destination_path: destination,
        status: SyncStatus::Ignored,
      });
    }

    self.transfer(folder, name, &request.base_name, &request.extension, &destination)?;

    self
      .store
      .set(name, packaged)
      .map_err(|source| SyncError::VersionStore {
        key: name.to_string(),
        source,
      })?;

    let status = copied_status(installed);
    info!(
      resource = name,
      asset = %asset.full_asset_path,
      destination = %destination.display(),
      ?installed,
      packaged,
      ?status,
      "synced packaged asset"
    );

    Ok(SyncOutcome {
      destination_path: destination,
      status,
    })
  }

  fn transfer(
    &mut self,
    folder: &str,
    name: &str,
    base: &str,
    extension: &ResourceExtension,
    destination: &Path,
  ) -> SyncResult<()> {
    let asset = self
      .locator
      .locate(self.package, folder, base, extension)?
      .ok_or_else(|| SyncError::not_found(folder, name, "packaged entry disappeared"))?;

    self
      .storage
      .remove_if_exists(destination)
      .map_err(|source| SyncError::CannotRemoveExisting {
        path: destination.to_path_buf(),
        source,
      })?;

    let transfer_failed = |source| SyncError::TransferFailed {
      asset: asset.full_asset_path.clone(),
      destination: destination.to_path_buf(),
      source,
    };
    let mut reader = self
      .package
      .open_entry(&asset.full_asset_path)
      .map_err(transfer_failed)?;
    let written = self
      .storage
      .write_all(destination, &mut reader)
      .map_err(transfer_failed)?;
    debug!(asset = %asset.full_asset_path, bytes = written, "copied packaged asset");

    if !self.storage.exists(destination) {
      return Err(SyncError::not_found(
        folder,
        name,
        format!("copied file is missing at {}", destination.display()),
      ));
    }
    Ok(())
  }
}
