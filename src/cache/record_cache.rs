use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::CacheError;
use crate::config::CacheOptions;
use crate::record::{CheeseId, CheeseRecord, Column, SortOrder};
use crate::store::RecordStore;

/// Identity-keyed cache of every cheese record, in load order.
///
/// Construct one per dataset and pass it to whatever drives it; each cache
/// owns its sequence and its store. Lookups are linear scans by id, which
/// stays cheap up to the low thousands of records.
///
/// Readers receive owned copies. The live sequence is only reachable through
/// the cache's own operations.
pub struct RecordCache<S: RecordStore> {
    store: S,
    records: RwLock<Vec<CheeseRecord>>,
    options: CacheOptions,
}

impl<S: RecordStore> RecordCache<S> {
    /// Load `store` once and cache the result. A failed load yields an empty
    /// cache, not an error.
    pub fn new(store: S) -> Self {
        Self::with_options(store, CacheOptions::default())
    }

    pub fn with_options(store: S, options: CacheOptions) -> Self {
        let records = store.load_all();
        debug!(count = records.len(), "record cache ready");
        Self {
            store,
            records: RwLock::new(records),
            options,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<RwLockReadGuard<'_, Vec<CheeseRecord>>, CacheError> {
        self.records
            .read()
            .map_err(|_| CacheError::LockPoisoned(operation))
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Vec<CheeseRecord>>, CacheError> {
        self.records
            .write()
            .map_err(|_| CacheError::LockPoisoned(operation))
    }

    /// Snapshot of every cached record, in order.
    pub fn get_all(&self) -> Result<Vec<CheeseRecord>, CacheError> {
        Ok(self.read("get_all")?.clone())
    }

    /// The first record with `id`, if any.
    pub fn get_by_id(&self, id: CheeseId) -> Result<Option<CheeseRecord>, CacheError> {
        let records = self.read("get_by_id")?;
        Ok(position(&records, id).map(|index| records[index].clone()))
    }

    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.read("is_empty")?.is_empty())
    }

    /// Every record matching `predicate`, in cache order.
    pub fn find(
        &self,
        predicate: impl Fn(&CheeseRecord) -> bool,
    ) -> Result<Vec<CheeseRecord>, CacheError> {
        let records = self.read("find")?;
        Ok(records.iter().filter(|r| predicate(*r)).cloned().collect())
    }

    /// Highest cached id, or 0 when the cache is empty.
    pub fn max_id(&self) -> Result<CheeseId, CacheError> {
        let records = self.read("max_id")?;
        Ok(records.iter().map(|r| r.cheese_id).max().unwrap_or(0))
    }

    /// An id no cached record uses: one past the highest.
    pub fn next_id(&self) -> Result<CheeseId, CacheError> {
        let max = self.max_id()?;
        max.checked_add(1).ok_or(CacheError::IdsExhausted { max })
    }

    /// Append `record`. Its id must not be cached yet.
    pub fn insert(&self, record: CheeseRecord) -> Result<(), CacheError> {
        let mut records = self.write("insert")?;
        if position(&records, record.cheese_id).is_some() {
            return Err(CacheError::DuplicateKey {
                id: record.cheese_id,
            });
        }

        if self.options.write_through {
            self.store.insert_one(&record)?;
        }
        records.push(record);
        Ok(())
    }

    /// Replace the cached record with the same id, keeping its position.
    pub fn update(&self, record: CheeseRecord) -> Result<(), CacheError> {
        let mut records = self.write("update")?;
        let index = position(&records, record.cheese_id).ok_or(CacheError::NotFound {
            id: record.cheese_id,
        })?;

        if self.options.write_through {
            self.store.update_one(&record)?;
        }
        records[index] = record;
        Ok(())
    }

    /// Remove the cached record with the same id as `record`.
    pub fn delete(&self, record: &CheeseRecord) -> Result<CheeseRecord, CacheError> {
        self.delete_by_id(record.cheese_id)
    }

    /// Remove the cached record with `id` and return it. Later records shift
    /// down by one.
    pub fn delete_by_id(&self, id: CheeseId) -> Result<CheeseRecord, CacheError> {
        let mut records = self.write("delete")?;
        let index = position(&records, id).ok_or(CacheError::NotFound { id })?;

        if self.options.write_through {
            self.store.delete_one(id)?;
        }
        Ok(records.remove(index))
    }

    /// Reorder the cache by `column`. Ties keep their current relative order.
    pub fn sort_by(&self, column: Column, order: SortOrder) -> Result<(), CacheError> {
        self.sort_by_keys(&[(column, order)])
    }

    /// Reorder the cache by several columns, the first key deciding first.
    /// Records equal on every key keep their current relative order, and an
    /// empty key list leaves the cache as it is.
    pub fn sort_by_keys(&self, keys: &[(Column, SortOrder)]) -> Result<(), CacheError> {
        let mut records = self.write("sort_by")?;
        records.sort_by(|a, b| {
            keys.iter().fold(Ordering::Equal, |ordering, (column, order)| {
                ordering.then_with(|| order.apply(column.compare(a, b)))
            })
        });
        Ok(())
    }

    /// Write every cached record through the store and return the path used.
    ///
    /// See [`RecordStore::save_all`] for how `target` is resolved.
    pub fn save_all(&self, target: Option<&Path>) -> Result<PathBuf, CacheError> {
        let records = self.read("save_all")?;
        let path = self.store.save_all(target, &records)?;
        debug!(path = %path.display(), count = records.len(), "record cache saved");
        Ok(path)
    }

    /// Discard the cached sequence and load the store again.
    pub fn reload(&self) -> Result<usize, CacheError> {
        let loaded = self.store.load_all();
        let mut records = self.write("reload")?;
        *records = loaded;
        debug!(count = records.len(), "record cache reloaded");
        Ok(records.len())
    }
}

/// Index of the first record with `id`.
fn position(records: &[CheeseRecord], id: CheeseId) -> Option<usize> {
    records.iter().position(|record| record.cheese_id == id)
}
