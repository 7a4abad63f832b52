use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::{
    BenchmarkStore, MaiHistoryStore, RepositoryError, BENCHMARK_SNAPSHOTS_KEY, MAI_HISTORY_KEY,
};
use crate::authority::domain::{BenchmarkSnapshot, MaiHistoryEntry};

/// A JSON array on disk, rewritten whole on every append.
///
/// A missing document reads as an empty log, and so does one that no longer
/// parses; the next append replaces it. Any other I/O failure is returned.
/// Writes go to a sibling temp file that is renamed over the log, so readers
/// never observe a half-written array.
#[derive(Debug)]
struct JsonLog {
    key: &'static str,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLog {
    fn new(dir: &Path, key: &'static str) -> Self {
        Self {
            key,
            path: dir.join(format!("{key}.json")),
            write_lock: Mutex::new(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> RepositoryError {
        RepositoryError::Io {
            key: self.key,
            source,
        }
    }

    fn read<T: DeserializeOwned>(&self) -> Result<Vec<T>, RepositoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key = self.key, error = %err, "history log corrupt, treating as empty");
            Vec::new()
        }))
    }

    fn write<T: Serialize>(&self, items: &[T]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let encoded = serde_json::to_vec_pretty(items).map_err(|source| RepositoryError::Encode {
            key: self.key,
            source,
        })?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))
    }

    fn append<T: Serialize + DeserializeOwned>(&self, item: T) -> Result<(), RepositoryError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable(format!("{} lock poisoned", self.key)))?;
        let mut items: Vec<T> = self.read()?;
        items.push(item);
        self.write(&items)
    }

    fn remove(&self) -> Result<(), RepositoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[derive(Debug)]
pub struct JsonFileMaiHistoryStore {
    log: JsonLog,
}

impl JsonFileMaiHistoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            log: JsonLog::new(dir.as_ref(), MAI_HISTORY_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log.path
    }
}

impl MaiHistoryStore for JsonFileMaiHistoryStore {
    fn append(&self, entry: MaiHistoryEntry) -> Result<(), RepositoryError> {
        self.log.append(entry)
    }

    fn all(&self) -> Result<Vec<MaiHistoryEntry>, RepositoryError> {
        self.log.read()
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.log.remove()
    }
}

#[derive(Debug)]
pub struct JsonFileBenchmarkStore {
    log: JsonLog,
}

impl JsonFileBenchmarkStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            log: JsonLog::new(dir.as_ref(), BENCHMARK_SNAPSHOTS_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log.path
    }
}

impl BenchmarkStore for JsonFileBenchmarkStore {
    fn append(&self, snapshot: BenchmarkSnapshot) -> Result<(), RepositoryError> {
        self.log.append(snapshot)
    }

    fn all(&self) -> Result<Vec<BenchmarkSnapshot>, RepositoryError> {
        self.log.read()
    }
}
