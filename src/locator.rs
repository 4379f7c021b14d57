//! Listing-backed asset lookup with a per-call cache.

use tracing::{debug, warn};

use crate::asset_paths::{build_candidate_patterns, find_matching_entry, make_package_path};
use crate::error::{SyncError, SyncResult};
use crate::models::{ResolvedAsset, ResourceExtension};
use crate::package::PackageSource;

#[derive(Debug, Clone, PartialEq, Eq)]
struct LocatorQuery {
  folder: String,
  base: String,
  extension: ResourceExtension,
}

/// Resolves resource names to packaged entries, remembering the last successful lookup.
///
/// The cache only answers the exact query that filled it and must be cleared before each
/// top-level sync so a previous call never leaks into the next one.
#[derive(Debug, Default)]
pub struct AssetLocator {
  cached: Option<(LocatorQuery, ResolvedAsset)>,
}

impl AssetLocator {
  /// Create a locator with an empty cache.
  pub fn new() -> Self {
    Self::default()
  }

  /// Forget the last lookup.
  pub fn clear_cache(&mut self) {
    self.cached = None;
  }

  /// Returns `true` when a lookup result is cached.
  pub fn is_cached(&self) -> bool {
    self.cached.is_some()
  }

  /// Find the packaged entry for `base` in `folder`.
  ///
  /// Listing failures are logged and reported as "no match", like an empty folder.
  pub fn locate(
    &mut self,
    package: &dyn PackageSource,
    folder: &str,
    base: &str,
    extension: &ResourceExtension,
  ) -> SyncResult<Option<ResolvedAsset>> {
    let query = LocatorQuery {
      folder: folder.to_string(),
      base: base.to_string(),
      extension: extension.clone(),
    };

    if let Some((cached_query, asset)) = &self.cached {
      if *cached_query == query {
        debug!(asset = %asset.full_asset_path, "asset lookup served from cache");
        return Ok(Some(asset.clone()));
      }
    }

    let patterns = build_candidate_patterns(base, extension)
      .map_err(|err| SyncError::invalid(format!("can not build name pattern for {base:?}: {err}")))?;

    let listing = match package.list_entries(folder) {
      Ok(listing) => listing,
      Err(err) => {
        warn!(folder, %err, "failed to list package folder, treating as no match");
        return Ok(None);
      }
    };
    debug!(folder, entries = listing.len(), "scanned package folder");

    let Some(entry_name) = find_matching_entry(listing.iter().map(String::as_str), &patterns) else {
      return Ok(None);
    };

    let asset = ResolvedAsset {
      full_asset_path: make_package_path(folder, entry_name),
      entry_name: entry_name.to_string(),
      extracted_version: patterns.version_of(entry_name),
      extension: patterns.extension_of(entry_name),
    };
    self.cached = Some((query, asset.clone()));
    Ok(Some(asset))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::{self, Read};
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct CountingPackage {
    entries: Vec<String>,
    listings: AtomicUsize,
  }

  impl CountingPackage {
    fn new(entries: &[&str]) -> Self {
      Self {
        entries: entries.iter().map(|entry| entry.to_string()).collect(),
        listings: AtomicUsize::new(0),
      }
    }
  }

  impl PackageSource for CountingPackage {
    fn list_entries(&self, _folder: &str) -> io::Result<Vec<String>> {
      self.listings.fetch_add(1, Ordering::SeqCst);
      Ok(self.entries.clone())
    }

    fn open_entry(&self, _path: &str) -> io::Result<Box<dyn Read + Send>> {
      Err(io::Error::new(io::ErrorKind::Unsupported, "listing only"))
    }
  }

  struct BrokenPackage;

  impl PackageSource for BrokenPackage {
    fn list_entries(&self, _folder: &str) -> io::Result<Vec<String>> {
      Err(io::Error::new(io::ErrorKind::NotFound, "no such folder"))
    }

    fn open_entry(&self, _path: &str) -> io::Result<Box<dyn Read + Send>> {
      Err(io::Error::new(io::ErrorKind::NotFound, "no such entry"))
    }
  }

  #[test]
  fn resolves_version_and_extension() {
    let package = CountingPackage::new(&["readme.txt", "data_28.db"]);
    let mut locator = AssetLocator::new();

    let asset = locator
      .locate(&package, "databases", "data", &ResourceExtension::Discover)
      .expect("lookup succeeds")
      .expect("asset is found");

    assert_eq!(asset.full_asset_path, "databases/data_28.db");
    assert_eq!(asset.extracted_version, 28);
    assert_eq!(asset.extension.as_deref(), Some("db"));
  }

  #[test]
  fn base_ending_in_digits_resolves_as_unversioned() {
    let package = CountingPackage::new(&["level_1.json"]);
    let mut locator = AssetLocator::new();

    let asset = locator
      .locate(&package, "seed", "level_1", &ResourceExtension::Exact("json".into()))
      .expect("lookup succeeds")
      .expect("asset is found");

    assert_eq!(asset.full_asset_path, "seed/level_1.json");
    assert_eq!(asset.extracted_version, 0);
  }

  #[test]
  fn repeated_lookups_hit_the_cache_until_cleared() {
    let package = CountingPackage::new(&["data_28.db"]);
    let mut locator = AssetLocator::new();
    let ext = ResourceExtension::Exact("db".into());

    for _ in 0..3 {
      assert!(locator.locate(&package, "databases", "data", &ext).unwrap().is_some());
    }
    assert_eq!(package.listings.load(Ordering::SeqCst), 1);

    locator.clear_cache();
    assert!(!locator.is_cached());
    locator.locate(&package, "databases", "data", &ext).unwrap();
    assert_eq!(package.listings.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn cache_does_not_answer_a_different_query() {
    let package = CountingPackage::new(&["data_28.db", "other.db"]);
    let mut locator = AssetLocator::new();

    locator
      .locate(&package, "databases", "data", &ResourceExtension::Discover)
      .unwrap();
    let other = locator
      .locate(&package, "databases", "other", &ResourceExtension::Discover)
      .unwrap()
      .expect("other is found");

    assert_eq!(other.entry_name, "other.db");
    assert_eq!(package.listings.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn misses_are_not_cached() {
    let package = CountingPackage::new(&["data_28.db"]);
    let mut locator = AssetLocator::new();

    let missing = locator
      .locate(&package, "databases", "data", &ResourceExtension::Bare)
      .unwrap();
    assert!(missing.is_none());
    assert!(!locator.is_cached());
  }

  #[test]
  fn listing_errors_become_no_match() {
    let mut locator = AssetLocator::new();
    let result = locator
      .locate(&BrokenPackage, "missing", "data", &ResourceExtension::Discover)
      .expect("listing errors are downgraded");
    assert!(result.is_none());
  }
}
