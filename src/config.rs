//! Configuration for the file store and the record cache.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the dataset file loaded when no other path is configured.
pub const DEFAULT_FILE_NAME: &str = "canadianCheeseDirectory.csv";

/// Options for [`FileStore`](crate::FileStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Dataset file, resolved relative to the working directory.
    pub path: PathBuf,

    /// Directory that receives files whose names the store generates.
    ///
    /// Used by [`RecordStore::save_all`](crate::RecordStore::save_all) when
    /// the caller does not supply a usable file name.
    pub save_dir: PathBuf,

    /// Whether mutations and saves are refused.
    ///
    /// When `true`, every operation other than loading and lookups returns
    /// [`StoreError::NotSupported`](crate::StoreError::NotSupported).
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE_NAME),
            save_dir: PathBuf::from("."),
            read_only: false,
        }
    }
}

impl StoreConfig {
    /// Configuration for a dataset at `path`. Generated names land beside it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let save_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            path,
            save_dir,
            read_only: false,
        }
    }

    pub fn with_save_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.save_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Options for [`RecordCache`](crate::RecordCache).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Whether insert, update and delete are forwarded to the store.
    ///
    /// When `false` (the default) mutations touch only memory and reach the
    /// disk through an explicit [`save_all`](crate::RecordCache::save_all).
    /// When `true` the store mutation runs first, and a store failure leaves
    /// the cache untouched.
    pub write_through: bool,
}

impl CacheOptions {
    pub fn write_through() -> Self {
        Self {
            write_through: true,
        }
    }
}
