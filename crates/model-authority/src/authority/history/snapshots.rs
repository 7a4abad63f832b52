use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RepositoryError;

pub const DEFAULT_SNAPSHOT_LIMIT: usize = 50;

/// A single probe of one model with one prompt, as submitted for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnapshot {
    pub brand: String,
    pub model: String,
    pub prompt: String,
    pub full_response: String,
    pub computed_score: f64,
    #[serde(default)]
    pub competitors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub prompt: String,
    pub full_response: String,
    pub computed_score: f64,
    pub competitors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

pub trait SnapshotRepository: Send + Sync {
    fn insert(&self, snapshot: NewSnapshot) -> Result<SnapshotRecord, RepositoryError>;

    /// Snapshots for `brand`, newest first, at most `limit` of them.
    fn recent(&self, brand: &str, limit: usize) -> Result<Vec<SnapshotRecord>, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePoint {
    pub date: DateTime<Utc>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelAverage {
    pub model: String,
    pub average_score: f64,
}

pub fn score_evolution(records: &[SnapshotRecord]) -> Vec<ScorePoint> {
    records
        .iter()
        .map(|record| ScorePoint {
            date: record.created_at,
            score: record.computed_score,
        })
        .collect()
}

/// Mean computed score per model, ordered by model name.
pub fn model_comparison(records: &[SnapshotRecord]) -> Vec<ModelAverage> {
    let mut totals: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for record in records {
        let slot = totals.entry(record.model.as_str()).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += record.computed_score;
    }

    totals
        .into_iter()
        .map(|(model, (count, total))| ModelAverage {
            model: model.to_string(),
            average_score: total / count as f64,
        })
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySnapshotRepository {
    records: Arc<Mutex<Vec<SnapshotRecord>>>,
    sequence: Arc<AtomicU64>,
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn insert(&self, snapshot: NewSnapshot) -> Result<SnapshotRecord, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = SnapshotRecord {
            id: format!("snap-{id:06}"),
            brand: snapshot.brand,
            model: snapshot.model,
            prompt: snapshot.prompt,
            full_response: snapshot.full_response,
            computed_score: snapshot.computed_score,
            competitors: snapshot.competitors,
            created_at: Utc::now(),
        };

        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("snapshot mutex poisoned".to_string()))?
            .push(record.clone());
        Ok(record)
    }

    fn recent(&self, brand: &str, limit: usize) -> Result<Vec<SnapshotRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("snapshot mutex poisoned".to_string()))?;

        let mut matching: Vec<SnapshotRecord> = guard
            .iter()
            .filter(|record| record.brand == brand)
            .cloned()
            .collect();
        // Insertion order breaks ties between identical timestamps.
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }
}
