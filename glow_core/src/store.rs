//! Daily record persistence.
//!
//! One record per calendar day, addressed by [`DateKey`]. A miss is a normal
//! result (`Ok(None)`), distinct from a zeroed record; the service relies on
//! that to decide when a day gets materialized.

use crate::{DailyRecord, DateKey, Error, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tempfile::NamedTempFile;

/// Keyed storage for daily records
pub trait RecordStore: Send + Sync {
    /// Fetch the record for `key`, or `None` if that day was never written
    fn get(&self, key: &DateKey) -> Result<Option<DailyRecord>>;

    /// Replace the record for `key`. Readers observe either the old or the
    /// new record, never a mix.
    fn put(&self, key: &DateKey, record: &DailyRecord) -> Result<()>;

    /// Every stored record, oldest first
    fn list(&self) -> Result<Vec<DailyRecord>>;

    /// Read-modify-write of one day. `f` receives the stored record and
    /// returns the record to store, or `None` to leave storage untouched.
    ///
    /// The default is a plain get then put and relies on the caller to keep
    /// writers of the same day apart.
    fn update(
        &self,
        key: &DateKey,
        f: &mut dyn FnMut(Option<DailyRecord>) -> Result<Option<DailyRecord>>,
    ) -> Result<()> {
        if let Some(record) = f(self.get(key)?)? {
            self.put(key, &record)?;
        }
        Ok(())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn get(&self, key: &DateKey) -> Result<Option<DailyRecord>> {
        (**self).get(key)
    }

    fn put(&self, key: &DateKey, record: &DailyRecord) -> Result<()> {
        (**self).put(key, record)
    }

    fn list(&self) -> Result<Vec<DailyRecord>> {
        (**self).list()
    }

    fn update(
        &self,
        key: &DateKey,
        f: &mut dyn FnMut(Option<DailyRecord>) -> Result<Option<DailyRecord>>,
    ) -> Result<()> {
        (**self).update(key, f)
    }
}

fn check_key(key: &DateKey, record: &DailyRecord) -> Result<()> {
    if record.date != *key {
        return Err(Error::InvalidArgument(format!(
            "Record dated {} cannot be stored under {}",
            record.date, key
        )));
    }
    Ok(())
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, mainly for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<DateKey, DailyRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("record map lock poisoned".into())
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &DateKey) -> Result<Option<DailyRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &DateKey, record: &DailyRecord) -> Result<()> {
        check_key(key, record)?;
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert(*key, record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<DailyRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Durable store keeping one `<YYYY-MM-DD>.json` file per day.
///
/// [`RecordStore::update`] holds an exclusive lock on `<YYYY-MM-DD>.lock`
/// for the whole read-modify-write, so separate handles and processes
/// sharing a directory never lose each other's changes.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Opened record store at {:?}", dir);
        Ok(Self { dir })
    }

    fn path_for(&self, key: &DateKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Exclusive lock on the day's lock file, released when the handle drops
    fn lock_day(&self, key: &DateKey) -> Result<File> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(format!("{}.lock", key)))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    /// Read one record file. Writers replace files by rename, so a reader
    /// always sees a complete record.
    fn read_record(path: &Path, key: &DateKey) -> Result<Option<DailyRecord>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut contents = String::new();
        std::io::BufReader::new(file).read_to_string(&mut contents)?;

        let record: DailyRecord = serde_json::from_str(&contents)?;
        if record.date != *key {
            return Err(Error::Storage(format!(
                "Record file {:?} holds date {}, expected {}",
                path, record.date, key
            )));
        }

        Ok(Some(record))
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &DateKey) -> Result<Option<DailyRecord>> {
        let record = Self::read_record(&self.path_for(key), key)?;
        tracing::debug!("Read record {}: {}", key, if record.is_some() { "hit" } else { "miss" });
        Ok(record)
    }

    /// Atomically writes the record by:
    /// 1. Writing to a temp file in the store directory
    /// 2. Syncing to disk
    /// 3. Renaming over the day's file
    fn put(&self, key: &DateKey, record: &DailyRecord) -> Result<()> {
        check_key(key, record)?;
        std::fs::create_dir_all(&self.dir)?;

        let temp = NamedTempFile::new_in(&self.dir)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(record)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        let path = self.path_for(key);
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote record {} to {:?}", key, path);
        Ok(())
    }

    fn update(
        &self,
        key: &DateKey,
        f: &mut dyn FnMut(Option<DailyRecord>) -> Result<Option<DailyRecord>>,
    ) -> Result<()> {
        let _lock = self.lock_day(key)?;
        if let Some(record) = f(self.get(key)?)? {
            self.put(key, &record)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<DailyRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let key = match path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(DateKey::parse)
            {
                Some(Ok(key)) => key,
                _ => {
                    tracing::warn!("Skipping {:?}: file name is not a date key", path);
                    continue;
                }
            };

            if let Some(record) = Self::read_record(&path, &key)? {
                records.push(record);
            }
        }

        records.sort_by(|a, b| a.date.cmp(&b.date));
        tracing::debug!("Listed {} records from {:?}", records.len(), self.dir);
        Ok(records)
    }
}
