//! Persistence of the last installed version per resource.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Key-value store remembering which version of each resource is installed.
///
/// Keys are resource names used verbatim. A missing key means "never installed", which is
/// distinct from a stored version of `0`.
pub trait VersionStore: Send + Sync {
  /// Last installed version for `key`, if any.
  fn get(&self, key: &str) -> io::Result<Option<u64>>;

  /// Record `version` for `key`; durable once this returns.
  fn set(&self, key: &str, version: u64) -> io::Result<()>;
}

/// In-process [`VersionStore`], forgotten when dropped.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
  versions: Mutex<BTreeMap<String, u64>>,
}

impl MemoryVersionStore {
  /// Create an empty store.
  pub fn new() -> Self {
    Self::default()
  }
}

impl VersionStore for MemoryVersionStore {
  fn get(&self, key: &str) -> io::Result<Option<u64>> {
    let versions = self.versions.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(versions.get(key).copied())
  }

  fn set(&self, key: &str, version: u64) -> io::Result<()> {
    let mut versions = self.versions.lock().unwrap_or_else(PoisonError::into_inner);
    versions.insert(key.to_string(), version);
    Ok(())
  }
}

/// On-disk layout of the JSON version store.
#[derive(Debug, Default, Deserialize, Serialize)]
struct VersionStoreFile {
  #[serde(default)]
  versions: BTreeMap<String, u64>,
}

/// [`VersionStore`] persisted as a JSON document.
///
/// The file is re-read on every access so that external edits are picked up; writes are
/// serialised within the process so concurrent syncs of different resources keep each other's
/// keys.
#[derive(Debug)]
pub struct JsonVersionStore {
  path: PathBuf,
  write_lock: Mutex<()>,
}

impl JsonVersionStore {
  /// Use the JSON document at `path`; it is created on the first write.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      write_lock: Mutex::new(()),
    }
  }

  /// Location of the backing document.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Every recorded version, sorted by key.
  pub fn entries(&self) -> io::Result<BTreeMap<String, u64>> {
    Ok(self.load()?.versions)
  }

  fn load(&self) -> io::Result<VersionStoreFile> {
    let contents = match fs::read_to_string(&self.path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(VersionStoreFile::default()),
      Err(err) => return Err(err),
    };

    serde_json::from_str(&contents).map_err(|err| io::Error::new(ErrorKind::InvalidData, err))
  }
}

impl VersionStore for JsonVersionStore {
  fn get(&self, key: &str) -> io::Result<Option<u64>> {
    Ok(self.load()?.versions.get(key).copied())
  }

  fn set(&self, key: &str, version: u64) -> io::Result<()> {
    let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

    let mut file = self.load()?;
    file.versions.insert(key.to_string(), version);

    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    // Renamed into place; readers never see a partial document.
    let mut staged = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut staged, &file)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(&self.path).map_err(|err| err.error)?;
    Ok(())
  }
}
