//! Data structures describing a sync request and its outcome.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{SyncError, SyncResult};

/// How the extension of a packaged resource is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceExtension {
  /// The packaged entry must carry exactly this extension.
  Exact(String),
  /// The packaged entry must not carry any extension.
  Bare,
  /// Any extension is accepted and taken from the matched entry; one is required.
  Discover,
}

impl ResourceExtension {
  /// Extension used for strict matching, `None` for bare names.
  pub fn as_exact(&self) -> Option<&str> {
    match self {
      Self::Exact(ext) => Some(ext),
      Self::Bare | Self::Discover => None,
    }
  }
}

/// Inputs to a single sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
  /// Folder inside the read-only package that holds the resource.
  pub source_folder: String,
  /// Resource name as supplied by the caller; also the installed-version key.
  pub resource_name: String,
  /// Resource identifier without version suffix or extension.
  pub base_name: String,
  /// Extension matching rule.
  pub extension: ResourceExtension,
  /// Writable folder receiving the copy; the session default is used when `None`.
  pub destination_folder: Option<PathBuf>,
}

impl ResourceRequest {
  /// Build a request from a resource name that may carry an extension.
  ///
  /// `data.db` matches `data.db` and `data_<N>.db` strictly. A name without an extension
  /// such as `data` accepts any extension found on the packaged entry and installs the
  /// copy under that extension.
  pub fn from_name(source_folder: impl Into<String>, resource_name: impl Into<String>) -> SyncResult<Self> {
    let resource_name = resource_name.into();
    ensure_name(&resource_name)?;

    let (base_name, extension) = match split_resource_name(&resource_name) {
      (base, Some(ext)) => {
        if ext.is_empty() {
          return Err(SyncError::invalid(format!(
            "resource name {resource_name:?} ends with an empty extension"
          )));
        }
        (base.to_string(), ResourceExtension::Exact(ext.to_string()))
      }
      (base, None) => (base.to_string(), ResourceExtension::Discover),
    };

    Ok(Self {
      source_folder: source_folder.into(),
      resource_name,
      base_name,
      extension,
      destination_folder: None,
    })
  }

  /// Build a request for a resource that is packaged without any extension.
  pub fn bare(source_folder: impl Into<String>, resource_name: impl Into<String>) -> SyncResult<Self> {
    let resource_name = resource_name.into();
    ensure_name(&resource_name)?;

    Ok(Self {
      source_folder: source_folder.into(),
      base_name: resource_name.clone(),
      resource_name,
      extension: ResourceExtension::Bare,
      destination_folder: None,
    })
  }

  /// Build a request from an explicit base name and extension pair.
  pub fn with_extension(
    source_folder: impl Into<String>,
    base_name: impl Into<String>,
    extension: impl Into<String>,
  ) -> SyncResult<Self> {
    let base_name = base_name.into();
    let extension = extension.into();
    ensure_name(&base_name)?;
    if extension.is_empty() {
      return Err(SyncError::invalid("the extension is empty"));
    }

    Ok(Self {
      source_folder: source_folder.into(),
      resource_name: format!("{base_name}.{extension}"),
      base_name,
      extension: ResourceExtension::Exact(extension),
      destination_folder: None,
    })
  }

  /// Install into `folder` instead of the session's default destination.
  pub fn destination(mut self, folder: impl Into<PathBuf>) -> Self {
    self.destination_folder = Some(folder.into());
    self
  }

  /// Reject requests whose public fields were emptied after construction.
  pub(crate) fn validate(&self) -> SyncResult<()> {
    ensure_name(&self.resource_name)?;
    if self.base_name.is_empty() {
      return Err(SyncError::invalid("the base name is empty"));
    }
    if matches!(&self.extension, ResourceExtension::Exact(ext) if ext.is_empty()) {
      return Err(SyncError::invalid("the extension is empty"));
    }
    Ok(())
  }
}

/// Split a resource name on its last dot.
///
/// Names starting with a dot are treated as bare names rather than as an empty base.
pub fn split_resource_name(name: &str) -> (&str, Option<&str>) {
  match name.rfind('.') {
    Some(index) if index > 0 => (&name[..index], Some(&name[index + 1..])),
    _ => (name, None),
  }
}

fn ensure_name(name: &str) -> SyncResult<()> {
  if name.is_empty() {
    return Err(SyncError::invalid("the resource name is empty"));
  }
  Ok(())
}

/// Packaged entry selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
  /// Package path of the entry (`folder/entry`).
  pub full_asset_path: String,
  /// File name of the entry inside its folder.
  pub entry_name: String,
  /// Version embedded in the entry name, `0` when it has none.
  pub extracted_version: u64,
  /// Extension carried by the entry name, if any.
  pub extension: Option<String>,
}

/// Classification of a finished sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
  /// Nothing was installed before; the asset was copied.
  Installed,
  /// An older version was replaced.
  Updated,
  /// The installed version is current; nothing was touched.
  Ignored,
}

/// Result of one sync call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
  /// Where the resource lives in local storage.
  pub destination_path: PathBuf,
  /// What the call did.
  pub status: SyncStatus,
}

impl SyncOutcome {
  /// Borrow the destination path.
  pub fn path(&self) -> &Path {
    &self.destination_path
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_with_extension_match_strictly() {
    let request = ResourceRequest::from_name("folder", "file1.ext1").expect("valid request");
    assert_eq!(request.base_name, "file1");
    assert_eq!(request.extension, ResourceExtension::Exact("ext1".into()));
    assert_eq!(request.resource_name, "file1.ext1");
  }

  #[test]
  fn names_without_extension_discover_it() {
    let request = ResourceRequest::from_name("databases", "data").expect("valid request");
    assert_eq!(request.base_name, "data");
    assert_eq!(request.extension, ResourceExtension::Discover);
  }

  #[test]
  fn splits_on_the_last_dot_only() {
    assert_eq!(split_resource_name("archive.tar.gz"), ("archive.tar", Some("gz")));
    assert_eq!(split_resource_name(".hidden"), (".hidden", None));
    assert_eq!(split_resource_name("plain"), ("plain", None));
  }

  #[test]
  fn rejects_empty_names_and_extensions() {
    assert!(matches!(
      ResourceRequest::from_name("folder", ""),
      Err(SyncError::InvalidRequest { .. })
    ));
    assert!(matches!(
      ResourceRequest::from_name("folder", "data."),
      Err(SyncError::InvalidRequest { .. })
    ));
    assert!(matches!(
      ResourceRequest::with_extension("folder", "data", ""),
      Err(SyncError::InvalidRequest { .. })
    ));
  }

  #[test]
  fn outcome_serialises_with_lowercase_status() {
    let outcome = SyncOutcome {
      destination_path: PathBuf::from("/priv/data.db"),
      status: SyncStatus::Installed,
    };
    let json = serde_json::to_string(&outcome).expect("outcome serialises");
    assert_eq!(json, r#"{"destinationPath":"/priv/data.db","status":"installed"}"#);
  }
}
