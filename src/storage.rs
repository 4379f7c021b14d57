//! Writable local storage receiving installed copies.

use std::fs;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

/// Writable storage the synced resources are installed into.
pub trait LocalStorage: Send + Sync {
  /// Returns `true` when a file exists at `path`.
  fn exists(&self, path: &Path) -> bool;

  /// Delete the file at `path`; returns whether there was one.
  fn remove_if_exists(&self, path: &Path) -> io::Result<bool>;

  /// Replace the content of `path` with everything read from `reader`.
  fn write_all(&self, path: &Path, reader: &mut dyn Read) -> io::Result<u64>;
}

/// [`LocalStorage`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl LocalStorage for FsStorage {
  fn exists(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn remove_if_exists(&self, path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
      Ok(()) => Ok(true),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
      Err(err) => Err(err),
    }
  }

  fn write_all(&self, path: &Path, reader: &mut dyn Read) -> io::Result<u64> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
      }
    }

    let mut file = fs::File::create(path)?;
    let written = io::copy(reader, &mut file)?;
    file.flush()?;
    file.sync_all()?;
    Ok(written)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn write_all_replaces_previous_content() -> io::Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("nested/data.db");

    FsStorage.write_all(&path, &mut &b"first version"[..])?;
    let written = FsStorage.write_all(&path, &mut &b"v2"[..])?;

    assert_eq!(written, 2);
    assert_eq!(fs::read(&path)?, b"v2");
    Ok(())
  }

  #[test]
  fn remove_if_exists_reports_presence() -> io::Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("data.db");
    fs::write(&path, b"old")?;

    assert!(FsStorage.remove_if_exists(&path)?);
    assert!(!FsStorage.exists(&path));
    assert!(!FsStorage.remove_if_exists(&path)?);
    Ok(())
  }
}
