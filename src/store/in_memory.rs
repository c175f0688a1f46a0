//! InMemoryStore - Vec-backed record store for testing and development.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{generated_file_name, usable_target, RecordStore, StoreError};
use crate::record::{CheeseId, CheeseRecord};

/// Internal stored representation of a record.
struct StoredRecord {
    id: CheeseId,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<StoredRecord>,
    saved: HashMap<PathBuf, Vec<CheeseRecord>>,
}

/// In-memory record store that keeps rows in insertion order.
///
/// Rows are held serialized, the way a real backend would hold them, so a
/// record that cannot round-trip fails here as it would on disk. Saves are
/// kept as named snapshots. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(
        records: impl IntoIterator<Item = CheeseRecord>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        let records: Vec<CheeseRecord> = records.into_iter().collect();
        store.insert_all(&records)?;
        Ok(store)
    }

    /// The snapshot written by an earlier `save_all` to `name`.
    pub fn saved(&self, name: impl AsRef<Path>) -> Option<Vec<CheeseRecord>> {
        let inner = self.inner.read().ok()?;
        inner.saved.get(name.as_ref()).cloned()
    }

    /// Names of every snapshot saved so far.
    pub fn saved_names(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.saved.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn encode(record: &CheeseRecord) -> Result<StoredRecord, StoreError> {
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Serde(e.to_string()))?;
        Ok(StoredRecord {
            id: record.cheese_id,
            bytes,
        })
    }

    fn decode(stored: &StoredRecord) -> Result<CheeseRecord, StoreError> {
        serde_json::from_slice(&stored.bytes).map_err(|e| StoreError::Serde(e.to_string()))
    }
}

impl RecordStore for InMemoryStore {
    fn load_all(&self) -> Vec<CheeseRecord> {
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(_) => {
                tracing::error!("in-memory store lock poisoned, loading nothing");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(inner.rows.len());
        for stored in &inner.rows {
            match Self::decode(stored) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::error!(error = %err, "abandoned in-memory load");
                    return Vec::new();
                }
            }
        }
        records
    }

    fn get_one(&self, id: CheeseId) -> Result<Option<CheeseRecord>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::LockPoisoned("get_one"))?;

        inner
            .rows
            .iter()
            .find(|stored| stored.id == id)
            .map(Self::decode)
            .transpose()
    }

    fn insert_one(&self, record: &CheeseRecord) -> Result<(), StoreError> {
        self.insert_all(std::slice::from_ref(record))
    }

    fn insert_all(&self, records: &[CheeseRecord]) -> Result<(), StoreError> {
        let encoded = records
            .iter()
            .map(Self::encode)
            .collect::<Result<Vec<_>, _>>()?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert_all"))?;

        for (i, stored) in encoded.iter().enumerate() {
            let clashes = inner.rows.iter().any(|row| row.id == stored.id)
                || encoded[..i].iter().any(|row| row.id == stored.id);
            if clashes {
                return Err(StoreError::DuplicateKey { id: stored.id });
            }
        }

        inner.rows.extend(encoded);
        Ok(())
    }

    fn update_one(&self, record: &CheeseRecord) -> Result<(), StoreError> {
        let encoded = Self::encode(record)?;
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("update_one"))?;

        let slot = inner
            .rows
            .iter_mut()
            .find(|row| row.id == record.cheese_id)
            .ok_or(StoreError::NotFound {
                id: record.cheese_id,
            })?;
        *slot = encoded;
        Ok(())
    }

    fn delete_one(&self, id: CheeseId) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete_one"))?;

        let index = inner
            .rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(StoreError::NotFound { id })?;
        inner.rows.remove(index);
        Ok(())
    }

    fn save_all(
        &self,
        target: Option<&Path>,
        records: &[CheeseRecord],
    ) -> Result<PathBuf, StoreError> {
        let name = usable_target(target)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(generated_file_name()));

        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("save_all"))?;
        inner.saved.insert(name.clone(), records.to_vec());

        Ok(name)
    }
}
