//! Caller-owned entry points for synchronising packaged resources.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::dispatch::Dispatcher;
use crate::engine::CopyEngine;
use crate::error::{SyncError, SyncResult};
use crate::locator::AssetLocator;
use crate::models::{ResolvedAsset, ResourceRequest, SyncOutcome};
use crate::package::{DirectoryPackage, PackageSource};
use crate::storage::{FsStorage, LocalStorage};
use crate::store::{JsonVersionStore, VersionStore};

/// Holds the collaborators and the per-call lookup cache for a series of syncs.
///
/// Sessions are cheap; create one per thread of use. Concurrent syncs of the same resource are
/// not serialised and must be ordered by the caller.
pub struct SyncSession {
  package: Arc<dyn PackageSource>,
  store: Arc<dyn VersionStore>,
  storage: Arc<dyn LocalStorage>,
  destination_root: PathBuf,
  locator: AssetLocator,
}

impl SyncSession {
  /// Create a session installing into `destination_root` unless a request names its own folder.
  pub fn new(
    package: Arc<dyn PackageSource>,
    store: Arc<dyn VersionStore>,
    storage: Arc<dyn LocalStorage>,
    destination_root: impl Into<PathBuf>,
  ) -> Self {
    Self {
      package,
      store,
      storage,
      destination_root: destination_root.into(),
      locator: AssetLocator::new(),
    }
  }

  /// Build a filesystem-backed session from configuration, resolving relative paths from `base_dir`.
  pub fn from_config(config: &SyncConfig, base_dir: &Path) -> Self {
    Self::new(
      Arc::new(DirectoryPackage::new(config.package_root_path(base_dir))),
      Arc::new(JsonVersionStore::new(config.version_store_path(base_dir))),
      Arc::new(FsStorage),
      config.destination_dir_path(base_dir),
    )
  }

  /// Default destination folder.
  pub fn destination_root(&self) -> &Path {
    &self.destination_root
  }

  /// Run the copy engine for `request` on the calling thread.
  pub fn sync(&mut self, request: &ResourceRequest) -> SyncResult<SyncOutcome> {
    self.locator.clear_cache();
    CopyEngine::new(
      self.package.as_ref(),
      self.store.as_ref(),
      self.storage.as_ref(),
      &mut self.locator,
      &self.destination_root,
    )
    .sync(request)
  }

  /// Copy `name` from `folder` into the default destination if the packaged version is newer.
  pub fn copy_if_new(&mut self, folder: &str, name: &str) -> SyncResult<SyncOutcome> {
    let request = ResourceRequest::from_name(folder, name)?;
    self.sync(&request)
  }

  /// Same as [`SyncSession::copy_if_new`] with an explicit destination folder.
  pub fn copy_if_new_to(
    &mut self,
    folder: &str,
    name: &str,
    destination: impl Into<PathBuf>,
  ) -> SyncResult<SyncOutcome> {
    let request = ResourceRequest::from_name(folder, name)?.destination(destination);
    self.sync(&request)
  }

  /// Resolve the packaged entry for `request` without copying anything.
  pub fn locate(&mut self, request: &ResourceRequest) -> SyncResult<ResolvedAsset> {
    request.validate()?;
    self.locator.clear_cache();
    self
      .locator
      .locate(
        self.package.as_ref(),
        &request.source_folder,
        &request.base_name,
        &request.extension,
      )?
      .ok_or_else(|| {
        SyncError::not_found(
          &request.source_folder,
          &request.resource_name,
          "no matching packaged entry",
        )
      })
  }

  /// Run `request` on a background worker and deliver the result on the foreground.
  ///
  /// `on_complete` is called exactly once, with the outcome or the failure, including a
  /// panic of the worker.
  pub fn sync_async<F>(&self, dispatcher: Arc<dyn Dispatcher>, request: ResourceRequest, on_complete: F)
  where
    F: FnOnce(SyncResult<SyncOutcome>) + Send + 'static,
  {
    let mut worker = self.detached();
    let foreground = Arc::clone(&dispatcher);

    dispatcher.background(Box::new(move || {
      let result = panic::catch_unwind(AssertUnwindSafe(|| worker.sync(&request)))
        .unwrap_or_else(|payload| {
          Err(SyncError::WorkerPanicked {
            message: panic_message(payload.as_ref()),
          })
        });
      foreground.foreground(Box::new(move || on_complete(result)));
    }));
  }

  /// Asynchronous counterpart of [`SyncSession::copy_if_new`].
  ///
  /// An invalid name is reported through `on_complete` like any other failure.
  pub fn copy_if_new_async<F>(
    &self,
    dispatcher: Arc<dyn Dispatcher>,
    folder: &str,
    name: &str,
    destination: Option<PathBuf>,
    on_complete: F,
  ) where
    F: FnOnce(SyncResult<SyncOutcome>) + Send + 'static,
  {
    let request = match ResourceRequest::from_name(folder, name) {
      Ok(request) => match destination {
        Some(destination) => request.destination(destination),
        None => request,
      },
      Err(err) => {
        dispatcher.foreground(Box::new(move || on_complete(Err(err))));
        return;
      }
    };
    self.sync_async(dispatcher, request, on_complete);
  }

  /// A session sharing the collaborators but with its own empty cache.
  fn detached(&self) -> SyncSession {
    Self::new(
      Arc::clone(&self.package),
      Arc::clone(&self.store),
      Arc::clone(&self.storage),
      self.destination_root.clone(),
    )
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}
