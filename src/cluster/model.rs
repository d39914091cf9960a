//! Clustering state: centroids plus the member sets of the last completed round.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::series::Series;

/// Counters for one assignment round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundStats {
    /// 1-based round number.
    pub round: usize,
    /// Exact DTW evaluations performed.
    pub dtw_evaluations: usize,
    /// Series/centroid pairs skipped because LB_Keogh already reached the best distance.
    pub lb_pruned: usize,
    /// Whether any series changed cluster compared with the previous round.
    pub assignment_changed: bool,
}

/// Centroids and cluster members, indexed by cluster `0..num_clusters`.
///
/// Produced by [`DtwKmeans::initialize`](super::DtwKmeans::initialize) and
/// advanced one round at a time by [`DtwKmeans::step`](super::DtwKmeans::step).
/// A failed round leaves the model untouched, so it always reflects the last
/// fully completed round.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel<K> {
    pub(crate) num_clusters: usize,
    pub(crate) shape: (usize, usize),
    pub(crate) centroids: Vec<Series>,
    /// Empty until the first round completes, then one entry per cluster.
    pub(crate) members: Vec<Vec<K>>,
    pub(crate) history: Vec<RoundStats>,
}

impl<K> ClusterModel<K> {
    pub(crate) fn new(centroids: Vec<Series>, shape: (usize, usize)) -> Self {
        Self {
            num_clusters: centroids.len(),
            shape,
            centroids,
            members: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Number of clusters.
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// `(len, dim)` every series in the run must have.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Current centroids, one per cluster.
    pub fn centroids(&self) -> &[Series] {
        &self.centroids
    }

    /// Centroid of `cluster`, if it exists.
    pub fn centroid(&self, cluster: usize) -> Option<&Series> {
        self.centroids.get(cluster)
    }

    /// Members of `cluster` from the last completed round.
    ///
    /// Empty before the first round or for an out-of-range index.
    pub fn members(&self, cluster: usize) -> &[K] {
        self.members.get(cluster).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Member lists for every cluster (empty before the first round).
    pub fn assignment(&self) -> &[Vec<K>] {
        &self.members
    }

    /// Number of members per cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        (0..self.num_clusters)
            .map(|c| self.members(c).len())
            .collect()
    }

    /// Number of rounds completed so far.
    pub fn rounds_completed(&self) -> usize {
        self.history.len()
    }

    /// Statistics for every completed round, in order.
    pub fn history(&self) -> &[RoundStats] {
        &self.history
    }

    /// Replace the centroid of `cluster`, e.g. after an
    /// [`Error::EmptyCluster`] round.
    pub fn reseed(&mut self, cluster: usize, centroid: Series) -> Result<()> {
        if cluster >= self.num_clusters {
            return Err(Error::InvalidParameter {
                name: "cluster",
                message: "index out of range",
            });
        }
        if centroid.shape() != self.shape {
            return Err(Error::ShapeMismatch {
                series: format!("centroid {cluster}"),
                expected: self.shape,
                found: centroid.shape(),
            });
        }
        self.centroids[cluster] = centroid;
        Ok(())
    }

    /// Split into `(centroids, members)`.
    pub fn into_parts(self) -> (Vec<Series>, Vec<Vec<K>>) {
        (self.centroids, self.members)
    }
}

impl<K: Ord + Clone> ClusterModel<K> {
    /// Cluster index of every assigned series.
    pub fn labels(&self) -> BTreeMap<K, usize> {
        self.members
            .iter()
            .enumerate()
            .flat_map(|(c, ids)| ids.iter().map(move |id| (id.clone(), c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ClusterModel<&'static str> {
        let centroids = vec![
            Series::univariate(vec![0.0, 0.0]).unwrap(),
            Series::univariate(vec![9.0, 9.0]).unwrap(),
        ];
        ClusterModel::new(centroids, (2, 1))
    }

    #[test]
    fn test_unassigned_model_is_empty() {
        let m = model();
        assert_eq!(m.num_clusters(), 2);
        assert!(m.assignment().is_empty());
        assert!(m.members(0).is_empty());
        assert_eq!(m.cluster_sizes(), vec![0, 0]);
        assert_eq!(m.rounds_completed(), 0);
    }

    #[test]
    fn test_labels_and_sizes() {
        let mut m = model();
        m.members = vec![vec!["a", "c"], vec!["b"]];
        assert_eq!(m.cluster_sizes(), vec![2, 1]);
        let labels = m.labels();
        assert_eq!(labels["a"], 0);
        assert_eq!(labels["b"], 1);
        assert_eq!(labels["c"], 0);
        assert!(m.members(7).is_empty());

        let (centroids, members) = m.into_parts();
        assert_eq!(centroids.len(), 2);
        assert_eq!(members[1], vec!["b"]);
    }

    #[test]
    fn test_reseed_checks_index_and_shape() {
        let mut m = model();
        let fresh = Series::univariate(vec![4.0, 5.0]).unwrap();
        m.reseed(1, fresh.clone()).unwrap();
        assert_eq!(m.centroid(1), Some(&fresh));

        assert!(m.reseed(2, fresh).is_err());
        let wrong = Series::univariate(vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            m.reseed(0, wrong),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
