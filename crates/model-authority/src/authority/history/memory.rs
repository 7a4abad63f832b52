use std::sync::{Arc, Mutex, MutexGuard};

use super::{BenchmarkStore, MaiHistoryStore, RepositoryError};
use crate::authority::domain::{BenchmarkSnapshot, MaiHistoryEntry};

fn lock<T>(log: &Mutex<Vec<T>>) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
    log.lock()
        .map_err(|_| RepositoryError::Unavailable("history mutex poisoned".to_string()))
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryMaiHistoryStore {
    entries: Arc<Mutex<Vec<MaiHistoryEntry>>>,
}

impl MaiHistoryStore for InMemoryMaiHistoryStore {
    fn append(&self, entry: MaiHistoryEntry) -> Result<(), RepositoryError> {
        lock(&self.entries)?.push(entry);
        Ok(())
    }

    fn all(&self) -> Result<Vec<MaiHistoryEntry>, RepositoryError> {
        Ok(lock(&self.entries)?.clone())
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        lock(&self.entries)?.clear();
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryBenchmarkStore {
    snapshots: Arc<Mutex<Vec<BenchmarkSnapshot>>>,
}

impl BenchmarkStore for InMemoryBenchmarkStore {
    fn append(&self, snapshot: BenchmarkSnapshot) -> Result<(), RepositoryError> {
        lock(&self.snapshots)?.push(snapshot);
        Ok(())
    }

    fn all(&self) -> Result<Vec<BenchmarkSnapshot>, RepositoryError> {
        Ok(lock(&self.snapshots)?.clone())
    }

    fn latest(&self) -> Result<Option<BenchmarkSnapshot>, RepositoryError> {
        Ok(lock(&self.snapshots)?.last().cloned())
    }
}
