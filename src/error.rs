//! Error type shared by every sync operation.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type SyncResult<T> = Result<T, SyncError>;

/// Reasons a single sync attempt can fail.
///
/// Every variant is fatal to the call that produced it; nothing is retried internally.
#[derive(Debug)]
pub enum SyncError {
  /// The request itself is unusable (empty name, empty derived path, bad extension).
  InvalidRequest {
    /// Human readable description of the rejected input.
    reason: String,
  },
  /// No packaged entry satisfies the request, or a required extension could not be derived.
  AssetNotFound {
    /// Package folder that was searched.
    folder: String,
    /// Resource name as requested by the caller.
    name: String,
    /// What exactly was missing.
    reason: String,
  },
  /// A previous copy exists at the destination and could not be deleted.
  CannotRemoveExisting {
    /// Destination path that could not be cleared.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Opening, reading or writing the asset bytes failed.
  TransferFailed {
    /// Packaged asset path being copied.
    asset: String,
    /// Destination path being written.
    destination: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The installed-version store could not be read or persisted.
  VersionStore {
    /// Key being read or written.
    key: String,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The background worker running an asynchronous sync panicked.
  WorkerPanicked {
    /// Panic payload, when it was a string.
    message: String,
  },
}

impl SyncError {
  pub(crate) fn invalid(reason: impl Into<String>) -> Self {
    Self::InvalidRequest {
      reason: reason.into(),
    }
  }

  pub(crate) fn not_found(folder: &str, name: &str, reason: impl Into<String>) -> Self {
    Self::AssetNotFound {
      folder: folder.to_string(),
      name: name.to_string(),
      reason: reason.into(),
    }
  }
}

impl std::fmt::Display for SyncError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InvalidRequest { reason } => write!(f, "invalid request: {reason}"),
      Self::AssetNotFound {
        folder,
        name,
        reason,
      } => {
        write!(f, "asset {name:?} not found in {folder:?}: {reason}")
      }
      Self::CannotRemoveExisting { path, source } => {
        write!(f, "can not remove old file {}: {}", path.display(), source)
      }
      Self::TransferFailed {
        asset,
        destination,
        source,
      } => {
        write!(
          f,
          "failed to copy {} to {}: {}",
          asset,
          destination.display(),
          source
        )
      }
      Self::VersionStore { key, source } => {
        write!(f, "failed to access stored version for {key:?}: {source}")
      }
      Self::WorkerPanicked { message } => write!(f, "sync worker panicked: {message}"),
    }
  }
}

impl std::error::Error for SyncError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::CannotRemoveExisting { source, .. } => Some(source),
      Self::TransferFailed { source, .. } => Some(source),
      Self::VersionStore { source, .. } => Some(source),
      Self::InvalidRequest { .. } | Self::AssetNotFound { .. } | Self::WorkerPanicked { .. } => {
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error;

  #[test]
  fn io_variants_expose_their_source() {
    let err = SyncError::TransferFailed {
      asset: "databases/data_2.db".into(),
      destination: PathBuf::from("/priv/data.db"),
      source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };

    assert!(err.source().is_some());
    assert_eq!(
      err.to_string(),
      "failed to copy databases/data_2.db to /priv/data.db: denied"
    );
  }

  #[test]
  fn request_errors_have_no_source() {
    let err = SyncError::not_found("databases", "data", "no matching packaged entry");
    assert!(err.source().is_none());
    assert!(err.to_string().contains("\"data\""));
  }
}
