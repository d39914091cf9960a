//! Per-round progress hooks.

use tracing::info;

use crate::series::Series;

/// Receives progress events while [`DtwKmeans`](super::DtwKmeans) runs.
///
/// Purely a side channel: implementations cannot influence the result. All
/// methods default to no-ops and `()` implements the trait. Round numbers are
/// 1-based.
pub trait RoundObserver<K> {
    /// Called before assignment, with the centroids the round will use.
    fn round_started(&mut self, _round: usize, _centroids: &[Series]) {}

    /// Called once every series has been assigned, before centroids are recomputed.
    fn assigned(&mut self, _round: usize, _members: &[Vec<K>]) {}

    /// Called after the round's centroids have been committed.
    fn centroids_updated(&mut self, _round: usize, _centroids: &[Series]) {}
}

impl<K> RoundObserver<K> for () {}

/// Reports round progress and cluster sizes as `tracing` events at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressLogger;

impl<K> RoundObserver<K> for ProgressLogger {
    fn round_started(&mut self, round: usize, centroids: &[Series]) {
        info!(round, clusters = centroids.len(), "round started");
    }

    fn assigned(&mut self, round: usize, members: &[Vec<K>]) {
        let sizes: Vec<usize> = members.iter().map(Vec::len).collect();
        info!(round, ?sizes, "series assigned");
    }
}
