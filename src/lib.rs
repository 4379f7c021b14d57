#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod locator;
pub mod models;
pub mod package;
pub mod session;
pub mod storage;
pub mod store;

pub use config::SyncConfig;
pub use dispatch::{Dispatcher, ThreadDispatcher};
pub use error::{SyncError, SyncResult};
pub use models::{ResolvedAsset, ResourceExtension, ResourceRequest, SyncOutcome, SyncStatus};
pub use package::{DirectoryPackage, PackageSource};
pub use session::SyncSession;
pub use storage::{FsStorage, LocalStorage};
pub use store::{JsonVersionStore, MemoryVersionStore, VersionStore};
