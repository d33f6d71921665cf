use crate::error::{Result, StatsError};
use crate::models::sample::Sample;

/// Width of the day-over-day window, in seconds.
pub const LAG_WINDOW_SECS: i64 = 86_400;

/// Find the baseline for a day-over-day delta: among samples strictly older than
/// `current` and at most one day older, the oldest one.
///
/// `history` may be in any order. Ties on timestamp resolve to the first
/// candidate encountered.
pub fn resolve_lag<'a>(history: &'a [Sample], current: &Sample) -> Result<&'a Sample> {
    let reference = current.epoch_seconds();

    history
        .iter()
        .filter(|s| {
            let age = reference - s.epoch_seconds();
            age > 0 && age <= LAG_WINDOW_SECS
        })
        .min_by_key(|s| s.epoch_seconds())
        .ok_or_else(|| {
            StatsError::not_found(
                "lag sample",
                format!("no sample within a day before {}", current.timestamp.to_rfc3339()),
            )
        })
}

/// Pair every sample of a time-sorted history with its lag sample.
/// Samples with no lag are skipped.
pub fn lag_series(sorted: &[Sample]) -> Vec<(&Sample, &Sample)> {
    let mut pairs = Vec::with_capacity(sorted.len());

    for sample in sorted {
        let reference = sample.epoch_seconds();
        let window_start = sorted.partition_point(|s| s.epoch_seconds() < reference - LAG_WINDOW_SECS);
        let strictly_older = sorted.partition_point(|s| s.epoch_seconds() < reference);

        if window_start < strictly_older {
            pairs.push((sample, &sorted[window_start]));
        }
    }

    pairs
}
