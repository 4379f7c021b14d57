//! Read-only package access.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Read-only storage holding the packaged assets.
///
/// Paths are package paths: forward-slash separated and relative to the package root.
pub trait PackageSource: Send + Sync {
  /// Names of the entries directly under `folder`, in listing order.
  fn list_entries(&self, folder: &str) -> io::Result<Vec<String>>;

  /// Open a packaged entry for reading.
  fn open_entry(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// A plain directory used as the package root.
#[derive(Debug, Clone)]
pub struct DirectoryPackage {
  root: PathBuf,
}

impl DirectoryPackage {
  /// Serve packaged assets from `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Root directory of the package.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn resolve(&self, path: &str) -> PathBuf {
    path
      .split('/')
      .filter(|segment| !segment.is_empty())
      .fold(self.root.clone(), |acc, segment| acc.join(segment))
  }
}

impl PackageSource for DirectoryPackage {
  fn list_entries(&self, folder: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(self.resolve(folder))? {
      let entry = entry?;
      if !entry.file_type()?.is_file() {
        continue;
      }
      if let Ok(name) = entry.file_name().into_string() {
        names.push(name);
      }
    }
    Ok(names)
  }

  fn open_entry(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
    let file = fs::File::open(self.resolve(path))?;
    Ok(Box::new(file))
  }
}
