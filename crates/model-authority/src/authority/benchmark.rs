use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::domain::{BenchmarkEntry, BenchmarkInput, BenchmarkSnapshot};

/// Ranks brands by index, highest first.
///
/// The sort is stable so equal scores keep their input order; NaN scores sink
/// to the bottom. Every entry shares the snapshot's generation time.
pub fn build_benchmark(
    industry: &str,
    entries: Vec<BenchmarkInput>,
    generated_at: DateTime<Utc>,
) -> BenchmarkSnapshot {
    let mut ranked = entries;
    ranked.sort_by(|a, b| descending(a.mai, b.mai));

    BenchmarkSnapshot {
        industry: industry.to_string(),
        entries: ranked
            .into_iter()
            .map(|input| BenchmarkEntry {
                brand: input.brand,
                mai: input.mai,
                som: input.som,
                calculated_at: generated_at,
            })
            .collect(),
        generated_at,
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Download location for a sector ranking export.
pub fn export_url(public_base_url: &str, sector: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "{}/exports/benchmark_{}_{}.csv",
        public_base_url.trim_end_matches('/'),
        sector.to_lowercase(),
        generated_at.timestamp_millis()
    )
}
