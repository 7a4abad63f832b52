//! Append-only logs of computed results.
//!
//! The scoring pipeline only ever appends and reads back whole logs, so the
//! store traits stay that narrow. Implementations cover process memory and a
//! JSON document per log on disk.

mod file;
mod memory;
pub mod snapshots;

pub use file::{JsonFileBenchmarkStore, JsonFileMaiHistoryStore};
pub use memory::{InMemoryBenchmarkStore, InMemoryMaiHistoryStore};
pub use snapshots::{
    model_comparison, score_evolution, InMemorySnapshotRepository, ModelAverage, NewSnapshot,
    ScorePoint, SnapshotRecord, SnapshotRepository, DEFAULT_SNAPSHOT_LIMIT,
};

use super::domain::{BenchmarkSnapshot, MaiHistoryEntry};

pub const MAI_HISTORY_KEY: &str = "mai_history";
pub const BENCHMARK_SNAPSHOTS_KEY: &str = "benchmark_snapshots";

pub trait MaiHistoryStore: Send + Sync {
    fn append(&self, entry: MaiHistoryEntry) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<MaiHistoryEntry>, RepositoryError>;
    fn clear(&self) -> Result<(), RepositoryError>;
}

pub trait BenchmarkStore: Send + Sync {
    fn append(&self, snapshot: BenchmarkSnapshot) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<BenchmarkSnapshot>, RepositoryError>;

    /// Most recently appended snapshot.
    fn latest(&self) -> Result<Option<BenchmarkSnapshot>, RepositoryError> {
        Ok(self.all()?.pop())
    }
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("i/o failure on {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
}
