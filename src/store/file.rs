//! FileStore - Delimited-file persistence for cheese records.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use super::csv_format;
use super::{generated_file_name, usable_target, RecordStore, StoreError};
use crate::config::StoreConfig;
use crate::record::{CheeseId, CheeseRecord};

/// Store backed by one delimited file on disk.
///
/// Every call opens the file it needs and releases it before returning.
/// Mutations hold an exclusive guard for the whole read-modify-write, and
/// rewrites go through a temporary sibling that replaces the original in one
/// rename, so a failed rewrite leaves the previous contents intact.
pub struct FileStore {
    config: StoreConfig,
    guard: Mutex<()>,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl FileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            guard: Mutex::new(()),
        }
    }

    /// Store over the dataset at `path` with default options.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Strict load: every failure is returned instead of degrading.
    pub fn try_load_all(&self) -> Result<Vec<CheeseRecord>, StoreError> {
        let path = self.path();
        let bytes = read_file(path)?;
        csv_format::read_bytes(&bytes, path)
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.guard
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn writable(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.config.read_only {
            return Err(StoreError::NotSupported(operation));
        }
        Ok(())
    }

    /// Loads the current file for a lookup or mutation. A missing file is an
    /// empty set.
    fn load_existing(&self) -> Result<Vec<CheeseRecord>, StoreError> {
        match self.try_load_all() {
            Err(StoreError::FileNotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Append `records` after checking none of their ids is persisted yet.
    fn insert_checked(
        &self,
        records: &[CheeseRecord],
        operation: &'static str,
    ) -> Result<(), StoreError> {
        self.writable(operation)?;
        let _guard = self.lock(operation)?;

        let (existing, header) = self.load_with_header()?;
        let mut incoming: Vec<CheeseId> = Vec::with_capacity(records.len());
        for record in records {
            let id = record.cheese_id;
            if existing.iter().any(|r| r.cheese_id == id) || incoming.contains(&id) {
                return Err(StoreError::DuplicateKey { id });
            }
            incoming.push(id);
        }

        if records.is_empty() {
            return Ok(());
        }
        self.append(records, header.as_deref())
    }

    /// Like `load_existing`, also returning the file's header row.
    fn load_with_header(&self) -> Result<(Vec<CheeseRecord>, Option<Vec<String>>), StoreError> {
        let path = self.path();
        match read_file(path) {
            Ok(bytes) => {
                let records = csv_format::read_bytes(&bytes, path)?;
                let header = csv_format::read_header(&bytes, path)?;
                Ok((records, header))
            }
            Err(StoreError::FileNotFound(_)) => Ok((Vec::new(), None)),
            Err(err) => Err(err),
        }
    }

    /// Append `records` under the file's existing `header`, or under a fresh
    /// canonical header when the file has none.
    fn append(
        &self,
        records: &[CheeseRecord],
        header: Option<&[String]>,
    ) -> Result<(), StoreError> {
        let path = self.path();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let len = file.metadata()?.len();
        let mut prefix = Vec::new();
        if len > 0 {
            file.seek(SeekFrom::Start(len - 1))?;
            let mut tail = [0u8; 1];
            file.read_exact(&mut tail)?;
            if csv_format::needs_line_break(Some(tail[0])) {
                prefix.extend_from_slice(b"\r\n");
            }
        }

        let body = match header {
            Some(columns) => csv_format::write_rows(prefix, columns, records)?,
            None => csv_format::write_records(prefix, records, true)?,
        };
        file.write_all(&body)?;
        release(file, path);

        debug!(path = %path.display(), count = records.len(), "appended cheese records");
        Ok(())
    }

    /// Replace the whole dataset file with `records`.
    fn rewrite(&self, records: &[CheeseRecord]) -> Result<(), StoreError> {
        write_atomic(self.path(), records)
    }
}

impl RecordStore for FileStore {
    fn load_all(&self) -> Vec<CheeseRecord> {
        let path = self.path();
        match self.try_load_all() {
            Ok(records) => {
                debug!(path = %path.display(), count = records.len(), "loaded cheese records");
                records
            }
            Err(StoreError::FileNotFound(_)) => {
                warn!(path = %path.display(), "cheese directory file not found, starting empty");
                Vec::new()
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "abandoned cheese directory load");
                Vec::new()
            }
        }
    }

    fn get_one(&self, id: CheeseId) -> Result<Option<CheeseRecord>, StoreError> {
        let _guard = self.lock("get_one")?;
        let records = self.load_existing()?;
        Ok(records.into_iter().find(|record| record.cheese_id == id))
    }

    fn insert_one(&self, record: &CheeseRecord) -> Result<(), StoreError> {
        self.insert_checked(std::slice::from_ref(record), "insert_one")
    }

    fn insert_all(&self, records: &[CheeseRecord]) -> Result<(), StoreError> {
        self.insert_checked(records, "insert_all")
    }

    fn update_one(&self, record: &CheeseRecord) -> Result<(), StoreError> {
        self.writable("update_one")?;
        let _guard = self.lock("update_one")?;

        let mut records = self.load_existing()?;
        let slot = records
            .iter_mut()
            .find(|r| r.cheese_id == record.cheese_id)
            .ok_or(StoreError::NotFound {
                id: record.cheese_id,
            })?;
        *slot = record.clone();

        self.rewrite(&records)
    }

    fn delete_one(&self, id: CheeseId) -> Result<(), StoreError> {
        self.writable("delete_one")?;
        let _guard = self.lock("delete_one")?;

        let mut records = self.load_existing()?;
        let index = records
            .iter()
            .position(|r| r.cheese_id == id)
            .ok_or(StoreError::NotFound { id })?;
        records.remove(index);

        self.rewrite(&records)
    }

    fn save_all(
        &self,
        target: Option<&Path>,
        records: &[CheeseRecord],
    ) -> Result<PathBuf, StoreError> {
        self.writable("save_all")?;
        let _guard = self.lock("save_all")?;

        let path = match usable_target(target) {
            Some(path) => path.to_path_buf(),
            None => {
                fs::create_dir_all(&self.config.save_dir)?;
                self.config.save_dir.join(generated_file_name())
            }
        };

        write_atomic(&path, records)?;
        debug!(path = %path.display(), count = records.len(), "saved cheese records");
        Ok(path)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, StoreError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::FileNotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Write a complete dataset to `path` through a temporary sibling file. An
/// existing file's permissions carry over to the replacement.
fn write_atomic(path: &Path, records: &[CheeseRecord]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir)?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    let temp = csv_format::write_records(temp, records, true)?;
    let file = temp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    release(file, path);
    Ok(())
}

/// Flush a finished handle to disk and close it.
///
/// The data was already written when this runs, so a failure here is only
/// reported; it never changes the outcome of the operation.
fn release(file: File, path: &Path) {
    if let Err(err) = file.sync_all() {
        warn!(path = %path.display(), error = %err, "failed to release cheese directory file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Column;
    use tempfile::TempDir;

    fn record(id: CheeseId, name: &str) -> CheeseRecord {
        CheeseRecord {
            cheese_id: id,
            cheese_name_en: name.into(),
            ..Default::default()
        }
    }

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::open(dir.path().join("cheese.csv"))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load_all().is_empty());
        assert!(matches!(
            store.try_load_all(),
            Err(StoreError::FileNotFound(_))
        ));
    }

    #[test]
    fn insert_into_new_file_writes_header() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.insert_one(&record(1, "Oka")).unwrap();
        store.insert_one(&record(2, "Brie")).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("CheeseId,CheeseNameEn,"));
        assert_eq!(text.matches("CheeseId").count(), 1);
        assert_eq!(store.load_all(), vec![record(1, "Oka"), record(2, "Brie")]);
    }

    #[test]
    fn append_repairs_unterminated_last_line() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save_all(Some(store.path()), &[record(1, "Oka")]).unwrap();

        let mut text = fs::read_to_string(store.path()).unwrap();
        text.truncate(text.trim_end().len());
        fs::write(store.path(), text).unwrap();

        store.insert_one(&record(2, "Brie")).unwrap();
        assert_eq!(store.load_all(), vec![record(1, "Oka"), record(2, "Brie")]);
    }

    #[test]
    fn append_follows_a_reordered_header() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut columns = Column::header();
        columns.reverse();
        let mut text = columns.join(",");
        text.push_str("\r\n");
        text.push_str(&",".repeat(columns.len() - 3));
        text.push_str(",Oka,1\r\n");
        fs::write(store.path(), text).unwrap();

        store.insert_one(&record(2, "Brie")).unwrap();

        assert_eq!(
            store.try_load_all().unwrap(),
            vec![record(1, "Oka"), record(2, "Brie")]
        );
        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.starts_with("LastUpdateDate,RindTypeEn,"));
    }

    #[test]
    fn append_leaves_unknown_columns_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut text = Column::header().join(",");
        text.push_str(",Extra\r\n1,Oka");
        text.push_str(&",".repeat(Column::ALL.len() - 2));
        text.push_str(",kept\r\n");
        fs::write(store.path(), &text).unwrap();

        store
            .insert_all(&[record(2, "Brie"), record(3, "Feta")])
            .unwrap();

        let records = store.try_load_all().unwrap();
        assert_eq!(records, vec![record(1, "Oka"), record(2, "Brie"), record(3, "Feta")]);
        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.starts_with(&text));
        assert!(written.ends_with(&format!("3,Feta{},\r\n", ",".repeat(16))));
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .insert_all(&[record(1, "Oka"), record(2, "Brie")])
            .unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.update_one(&record(1, "Oka Classique")).unwrap();
        store.delete_one(2).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(store.load_all(), vec![record(1, "Oka Classique")]);
    }

    #[test]
    fn insert_rejects_existing_and_repeated_ids() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert_one(&record(1, "Oka")).unwrap();

        let err = store.insert_one(&record(1, "Again")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { id: 1 }));

        let err = store
            .insert_all(&[record(2, "Brie"), record(2, "Brie")])
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { id: 2 }));
        assert_eq!(store.load_all(), vec![record(1, "Oka")]);
    }

    #[test]
    fn update_and_delete_rewrite_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .insert_all(&[record(1, "Oka"), record(2, "Brie"), record(3, "Feta")])
            .unwrap();

        store.update_one(&record(2, "Bleu")).unwrap();
        store.delete_one(1).unwrap();

        assert_eq!(store.load_all(), vec![record(2, "Bleu"), record(3, "Feta")]);
        assert_eq!(store.get_one(3).unwrap(), Some(record(3, "Feta")));
        assert_eq!(store.get_one(1).unwrap(), None);
    }

    #[test]
    fn update_and_delete_missing_ids_fail() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.insert_one(&record(1, "Oka")).unwrap();

        assert!(matches!(
            store.update_one(&record(9, "Nope")),
            Err(StoreError::NotFound { id: 9 })
        ));
        assert!(matches!(
            store.delete_one(9),
            Err(StoreError::NotFound { id: 9 })
        ));
        assert_eq!(store.load_all(), vec![record(1, "Oka")]);
    }

    #[test]
    fn mutations_never_overwrite_a_malformed_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "CheeseId,CheeseNameEn\n\"1,Oka\n").unwrap();

        assert!(store.load_all().is_empty());
        assert!(store.update_one(&record(1, "Oka")).is_err());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "CheeseId,CheeseNameEn\n\"1,Oka\n"
        );
    }

    #[test]
    fn read_only_refuses_writes() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(StoreConfig::new(dir.path().join("cheese.csv")).read_only());

        assert!(matches!(
            store.insert_one(&record(1, "Oka")),
            Err(StoreError::NotSupported("insert_one"))
        ));
        assert!(matches!(
            store.save_all(None, &[]),
            Err(StoreError::NotSupported("save_all"))
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn save_without_name_generates_one_in_save_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");
        let config = StoreConfig::new(dir.path().join("cheese.csv")).with_save_dir(&out);
        let store = FileStore::new(config);

        let written = store.save_all(None, &[record(1, "Oka")]).unwrap();
        assert_eq!(written.parent(), Some(out.as_path()));
        assert_eq!(written.extension().and_then(|e| e.to_str()), Some("csv"));

        let again = store.save_all(Some(Path::new("")), &[]).unwrap();
        assert_ne!(written, again);
        assert!(again.exists());
    }
}
