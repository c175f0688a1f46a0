//! Stores - Persistence behind the record cache.
//!
//! A [`RecordStore`] is the only component that knows how records live
//! outside the process. The cache loads from it once and hands it full
//! snapshots on save; per-record mutations are available for callers that
//! want them.
//!
//! ## Example
//!
//! ```no_run
//! use cheese_directory::{FileStore, RecordStore, StoreConfig};
//!
//! let store = FileStore::new(StoreConfig::new("canadianCheeseDirectory.csv"));
//! let records = store.load_all();
//! let written = store.save_all(None, &records)?;
//! println!("saved {} records to {}", records.len(), written.display());
//! # Ok::<(), cheese_directory::StoreError>(())
//! ```

pub(crate) mod csv_format;
mod file;
mod in_memory;

use std::io;
use std::path::{Path, PathBuf};

use crate::record::{CheeseId, CheeseRecord};

pub use file::FileStore;
pub use in_memory::InMemoryStore;

/// Persistence contract for cheese records.
///
/// Only [`load_all`](RecordStore::load_all) is required. The mutation
/// operations default to [`StoreError::NotSupported`] so a load-only store
/// still answers every call explicitly.
pub trait RecordStore: Send + Sync {
    /// Load every persisted record in storage order.
    ///
    /// Never fails: a missing or malformed source is reported through
    /// `tracing` and yields an empty sequence.
    fn load_all(&self) -> Vec<CheeseRecord>;

    /// Look up one persisted record by id.
    fn get_one(&self, id: CheeseId) -> Result<Option<CheeseRecord>, StoreError> {
        let _ = id;
        Err(StoreError::NotSupported("get_one"))
    }

    /// Persist a new record after the existing ones.
    fn insert_one(&self, record: &CheeseRecord) -> Result<(), StoreError> {
        let _ = record;
        Err(StoreError::NotSupported("insert_one"))
    }

    /// Persist a batch of new records. Nothing is written if any id clashes.
    fn insert_all(&self, records: &[CheeseRecord]) -> Result<(), StoreError> {
        let _ = records;
        Err(StoreError::NotSupported("insert_all"))
    }

    /// Replace the persisted record with the same id, keeping its position.
    fn update_one(&self, record: &CheeseRecord) -> Result<(), StoreError> {
        let _ = record;
        Err(StoreError::NotSupported("update_one"))
    }

    /// Remove the persisted record with this id.
    fn delete_one(&self, id: CheeseId) -> Result<(), StoreError> {
        let _ = id;
        Err(StoreError::NotSupported("delete_one"))
    }

    /// Write `records` as a complete dataset and return where it went.
    ///
    /// A `target` that names a file is used as given. `None`, an empty path,
    /// or a path without a file name lets the store pick a unique name.
    fn save_all(
        &self,
        target: Option<&Path>,
        records: &[CheeseRecord],
    ) -> Result<PathBuf, StoreError>;
}

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The dataset file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A row could not be mapped onto a record.
    #[error(
        "malformed row in {} at line {}: {message}",
        .path.display(),
        .line.map_or_else(|| "?".to_string(), |l| l.to_string())
    )]
    MalformedRow {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    /// A record with this id is already persisted.
    #[error("duplicate cheese id: {id}")]
    DuplicateKey { id: CheeseId },

    /// No persisted record has this id.
    #[error("cheese not found: {id}")]
    NotFound { id: CheeseId },

    /// The store does not offer this operation.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// Serialization/deserialization error.
    #[error("record serialization error: {0}")]
    Serde(String),

    /// The store's guard was poisoned by a panicking writer.
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Returns the file name a save should use, or `None` if the caller's target
/// is unusable and a generated name is needed.
pub(crate) fn usable_target(target: Option<&Path>) -> Option<&Path> {
    target.filter(|path| !path.as_os_str().is_empty() && path.file_name().is_some())
}

/// A globally unique dataset file name.
pub(crate) fn generated_file_name() -> String {
    format!("{}.csv", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LoadOnly;

    impl RecordStore for LoadOnly {
        fn load_all(&self) -> Vec<CheeseRecord> {
            vec![CheeseRecord::new(1)]
        }

        fn save_all(
            &self,
            _target: Option<&Path>,
            _records: &[CheeseRecord],
        ) -> Result<PathBuf, StoreError> {
            Err(StoreError::NotSupported("save_all"))
        }
    }

    #[test]
    fn default_mutations_are_not_supported() {
        let store = LoadOnly;
        let record = CheeseRecord::new(2);

        assert!(matches!(
            store.get_one(1),
            Err(StoreError::NotSupported("get_one"))
        ));
        assert!(matches!(
            store.insert_one(&record),
            Err(StoreError::NotSupported("insert_one"))
        ));
        assert!(matches!(
            store.insert_all(&[record.clone()]),
            Err(StoreError::NotSupported("insert_all"))
        ));
        assert!(matches!(
            store.update_one(&record),
            Err(StoreError::NotSupported("update_one"))
        ));
        assert!(matches!(
            store.delete_one(2),
            Err(StoreError::NotSupported("delete_one"))
        ));
    }

    #[test]
    fn usable_target_requires_a_file_name() {
        assert_eq!(
            usable_target(Some(Path::new("out/cheese.csv"))),
            Some(Path::new("out/cheese.csv"))
        );
        assert_eq!(usable_target(Some(Path::new(""))), None);
        assert_eq!(usable_target(Some(Path::new(".."))), None);
        assert_eq!(usable_target(Some(Path::new("/"))), None);
        assert_eq!(usable_target(None), None);
    }

    #[test]
    fn generated_names_are_unique_csv_files() {
        let a = generated_file_name();
        let b = generated_file_name();
        assert!(a.ends_with(".csv"));
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_row_display_includes_line() {
        let err = StoreError::MalformedRow {
            path: PathBuf::from("cheese.csv"),
            line: Some(4),
            message: "found record with 3 fields".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed row in cheese.csv at line 4: found record with 3 fields"
        );
    }
}
