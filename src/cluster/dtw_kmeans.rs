//! K-means over whole time series with DTW as the distance.
//!
//! Lloyd's iteration, with two changes to cope with an expensive, elastic metric:
//!
//! 1. **Assign**: each series goes to the centroid with the smallest DTW
//!    distance. Before paying for DTW, the LB_Keogh bound against the
//!    centroid's envelope is compared with the best distance found so far; a
//!    bound that already reaches it cannot win and the DTW call is skipped.
//! 2. **Update**: each centroid becomes the elementwise mean (per time step,
//!    per feature) of its members. All series share one `(len, dim)` shape, so
//!    the mean is a series of that same shape.
//!
//! The loop runs a fixed number of rounds. There is no convergence test unless
//! [`DtwKmeans::with_stop_on_stable`] opts into stopping once a round leaves
//! every assignment unchanged.
//!
//! # Failure Modes
//!
//! - **Empty cluster**: a centroid that wins no series has no defined mean.
//!   The round fails with [`Error::EmptyCluster`]; nothing is silently
//!   retained or reseeded. Callers driving [`DtwKmeans::step`] themselves can
//!   [`ClusterModel::reseed`] and retry.
//! - **Pruning with a narrow radius**: LB_Keogh with radius `r` bounds DTW
//!   constrained to the same radius. With a DTW window wider than `r` (or no
//!   window) the bound may overshoot and skip a centroid that would have won.

use std::collections::BTreeMap;
use std::fmt::Display;

use rand::prelude::*;
use tracing::{debug, instrument, warn};

use super::model::{ClusterModel, RoundStats};
use super::observer::RoundObserver;
use super::traits::SeriesClustering;
use crate::distance::{dtw_distance, Envelope};
use crate::error::{Error, Result};
use crate::series::Series;

/// Default LB_Keogh radius used for pruning.
pub const DEFAULT_LB_RADIUS: usize = 5;

/// DTW k-means clustering of time series.
#[derive(Debug, Clone)]
pub struct DtwKmeans {
    /// Number of clusters.
    k: usize,
    /// Number of assignment/update rounds.
    n_iter: usize,
    /// DTW locality window; `None` is unconstrained.
    window: Option<usize>,
    /// LB_Keogh envelope radius.
    lb_radius: usize,
    /// Random seed for centroid sampling.
    seed: Option<u64>,
    /// Stop early once a round changes no assignment.
    stop_on_stable: bool,
}

impl DtwKmeans {
    /// Create a new DTW k-means clusterer.
    ///
    /// Defaults: 10 rounds, DTW window 2, LB_Keogh radius 5, no seed.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_iter: 10,
            window: Some(2),
            lb_radius: DEFAULT_LB_RADIUS,
            seed: None,
            stop_on_stable: false,
        }
    }

    /// Set the number of rounds.
    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Set the DTW locality window (`None` or `Some(0)` for unconstrained DTW).
    pub fn with_window(mut self, window: Option<usize>) -> Self {
        self.window = window;
        self
    }

    /// Set the LB_Keogh envelope radius.
    pub fn with_lb_radius(mut self, radius: usize) -> Self {
        self.lb_radius = radius;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Stop before `n_iter` rounds once a round reproduces the previous assignment.
    pub fn with_stop_on_stable(mut self, stop: bool) -> Self {
        self.stop_on_stable = stop;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.n_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "n_iter",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Check every series against `expected`, or against the first series when `None`.
    fn check_shapes<K: Display>(
        data: &BTreeMap<K, Series>,
        expected: Option<(usize, usize)>,
    ) -> Result<(usize, usize)> {
        let Some(expected) = expected.or_else(|| data.values().next().map(Series::shape)) else {
            return Err(Error::EmptyInput);
        };
        for (id, series) in data {
            if series.shape() != expected {
                return Err(Error::ShapeMismatch {
                    series: id.to_string(),
                    expected,
                    found: series.shape(),
                });
            }
        }
        Ok(expected)
    }

    /// Validate `data` and sample `k` distinct series as initial centroids.
    ///
    /// The returned model has no assignment yet.
    pub fn initialize<K: Ord + Clone + Display>(
        &self,
        data: &BTreeMap<K, Series>,
    ) -> Result<ClusterModel<K>> {
        self.validate()?;

        if data.len() < self.k {
            return Err(Error::InsufficientData {
                requested: self.k,
                available: data.len(),
            });
        }
        let shape = Self::check_shapes(data, None)?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let pool: Vec<&Series> = data.values().collect();
        let centroids = rand::seq::index::sample(&mut rng, pool.len(), self.k)
            .into_iter()
            .map(|i| pool[i].clone())
            .collect();

        Ok(ClusterModel::new(centroids, shape))
    }

    /// Run one assignment/update round and commit it to `model`.
    ///
    /// On error `model` is left exactly as it was.
    pub fn step<K, O>(
        &self,
        model: &mut ClusterModel<K>,
        data: &BTreeMap<K, Series>,
        observer: &mut O,
    ) -> Result<RoundStats>
    where
        K: Ord + Clone + Display,
        O: RoundObserver<K> + ?Sized,
    {
        Self::check_shapes(data, Some(model.shape))?;

        let round = model.rounds_completed() + 1;
        let (len, dim) = model.shape;
        observer.round_started(round, &model.centroids);

        let envelopes: Vec<Envelope> = model
            .centroids
            .iter()
            .map(|c| Envelope::new(c, len, self.lb_radius))
            .collect();

        let entries: Vec<(&K, &Series)> = data.iter().collect();
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); model.num_clusters];
        let mut stats = RoundStats {
            round,
            ..RoundStats::default()
        };

        for (idx, &(id, series)) in entries.iter().enumerate() {
            let mut best_dist = f64::INFINITY;
            let mut best_cluster = None;

            for (c, (centroid, envelope)) in model.centroids.iter().zip(&envelopes).enumerate() {
                if envelope.lower_bound(series)? < best_dist {
                    let dist = dtw_distance(series, centroid, self.window)?;
                    stats.dtw_evaluations += 1;
                    if dist < best_dist {
                        best_dist = dist;
                        best_cluster = Some(c);
                    }
                } else {
                    stats.lb_pruned += 1;
                }
            }

            let cluster = best_cluster.ok_or_else(|| Error::UnassignableSeries {
                series: id.to_string(),
                round,
            })?;
            groups[cluster].push(idx);
        }

        let members: Vec<Vec<K>> = groups
            .iter()
            .map(|g| g.iter().map(|&i| entries[i].0.clone()).collect())
            .collect();
        observer.assigned(round, &members);

        if let Some(empty) = groups.iter().position(Vec::is_empty) {
            warn!(round, cluster = empty, "cluster received no members");
            return Err(Error::EmptyCluster {
                cluster: empty,
                round,
            });
        }

        let centroids = groups
            .iter()
            .map(|g| mean_series(g.iter().map(|&i| entries[i].1), len, dim))
            .collect::<Result<Vec<_>>>()?;

        stats.assignment_changed = members != model.members;
        debug!(
            round,
            dtw_evaluations = stats.dtw_evaluations,
            lb_pruned = stats.lb_pruned,
            changed = stats.assignment_changed,
            "round complete"
        );

        model.members = members;
        model.centroids = centroids;
        model.history.push(stats);
        observer.centroids_updated(round, &model.centroids);

        Ok(stats)
    }

    /// Sample initial centroids and run the configured number of rounds.
    ///
    /// # Errors
    ///
    /// Any error from [`initialize`](Self::initialize) or [`step`](Self::step).
    /// A round that fails (e.g. [`Error::EmptyCluster`]) ends the run and the
    /// model from the earlier rounds is dropped with it. Callers that want to
    /// keep that model and reseed should drive `initialize` and `step` directly.
    pub fn fit<K: Ord + Clone + Display>(
        &self,
        data: &BTreeMap<K, Series>,
    ) -> Result<ClusterModel<K>> {
        self.fit_with_observer(data, &mut ())
    }

    /// Like [`fit`](Self::fit), reporting progress to `observer`.
    ///
    /// Fails the same way as `fit`: the first failing round's error is
    /// returned and no partial model survives.
    #[instrument(skip(self, data, observer), fields(k = self.k, n_series = data.len(), n_iter = self.n_iter))]
    pub fn fit_with_observer<K, O>(
        &self,
        data: &BTreeMap<K, Series>,
        observer: &mut O,
    ) -> Result<ClusterModel<K>>
    where
        K: Ord + Clone + Display,
        O: RoundObserver<K> + ?Sized,
    {
        let mut model = self.initialize(data)?;
        for _ in 0..self.n_iter {
            let stats = self.step(&mut model, data, observer)?;
            if self.stop_on_stable && !stats.assignment_changed {
                debug!(round = stats.round, "assignment stable, stopping early");
                break;
            }
        }
        Ok(model)
    }
}

impl SeriesClustering for DtwKmeans {
    fn fit_predict(&self, data: &[Series]) -> Result<Vec<usize>> {
        let keyed: BTreeMap<usize, Series> = data.iter().cloned().enumerate().collect();
        let labels = self.fit(&keyed)?.labels();
        Ok(labels.into_values().collect())
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// Elementwise mean of equally shaped series.
fn mean_series<'a>(
    members: impl Iterator<Item = &'a Series>,
    len: usize,
    dim: usize,
) -> Result<Series> {
    let mut sum = vec![0.0f64; len * dim];
    let mut count = 0usize;
    for series in members {
        for (acc, v) in sum.iter_mut().zip(series.as_slice()) {
            *acc += v;
        }
        count += 1;
    }
    if count == 0 {
        return Err(Error::EmptyInput);
    }
    let n = count as f64;
    for v in &mut sum {
        *v /= n;
    }
    Series::new(sum, dim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f64, len: usize) -> Series {
        Series::univariate(vec![value; len]).unwrap()
    }

    fn two_groups() -> BTreeMap<String, Series> {
        let mut data = BTreeMap::new();
        for (i, base) in [0.0, 0.1, 0.2].iter().enumerate() {
            data.insert(format!("low{i}"), constant(*base, 6));
        }
        for (i, base) in [10.0, 10.1, 10.2].iter().enumerate() {
            data.insert(format!("high{i}"), constant(*base, 6));
        }
        data
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<(&'static str, usize)>,
    }

    impl RoundObserver<String> for Recorder {
        fn round_started(&mut self, round: usize, _centroids: &[Series]) {
            self.events.push(("start", round));
        }
        fn assigned(&mut self, round: usize, _members: &[Vec<String>]) {
            self.events.push(("assigned", round));
        }
        fn centroids_updated(&mut self, round: usize, _centroids: &[Series]) {
            self.events.push(("updated", round));
        }
    }

    #[test]
    fn test_two_far_apart_constants_single_round() {
        let mut data = BTreeMap::new();
        data.insert("zeros", constant(0.0, 5));
        data.insert("tens", constant(10.0, 5));

        let engine = DtwKmeans::new(2).with_n_iter(1).with_seed(7);
        let mut model = engine.initialize(&data).unwrap();
        let initial = model.centroids().to_vec();
        assert_ne!(initial[0], initial[1]);

        engine.step(&mut model, &data, &mut ()).unwrap();

        for c in 0..2 {
            let members = model.members(c);
            assert_eq!(members.len(), 1);
            // Each series lands on the centroid sampled from it.
            assert_eq!(data[members[0]], initial[c]);
            // A single-member cluster reproduces its member exactly.
            assert_eq!(model.centroids()[c], initial[c]);
        }
    }

    #[test]
    fn test_groups_separate() {
        let data = two_groups();
        let model = DtwKmeans::new(2).with_n_iter(5).with_seed(42).fit(&data).unwrap();

        let labels = model.labels();
        assert_eq!(labels["low0"], labels["low1"]);
        assert_eq!(labels["low0"], labels["low2"]);
        assert_eq!(labels["high0"], labels["high1"]);
        assert_eq!(labels["high0"], labels["high2"]);
        assert_ne!(labels["low0"], labels["high0"]);

        let low = model.centroid(labels["low0"]).unwrap();
        for v in low.as_slice() {
            assert!((v - 0.1).abs() < 1e-12);
        }
        assert_eq!(model.rounds_completed(), 5);
    }

    #[test]
    fn test_every_series_assigned_exactly_once() {
        let data = two_groups();
        let model = DtwKmeans::new(2).with_n_iter(3).with_seed(1).fit(&data).unwrap();
        let total: usize = model.cluster_sizes().iter().sum();
        assert_eq!(total, data.len());
        assert_eq!(model.labels().len(), data.len());
    }

    #[test]
    fn test_deterministic_with_seed() {
        let data = two_groups();
        let a = DtwKmeans::new(2).with_seed(99).fit(&data).unwrap();
        let b = DtwKmeans::new(2).with_seed(99).fit(&data).unwrap();
        assert_eq!(a, b, "same seed should give same result");
    }

    #[test]
    fn test_empty_cluster_is_an_error() {
        // Three identical series, three clusters: ties go to the lowest index,
        // so clusters 1 and 2 never win.
        let mut data = BTreeMap::new();
        for id in ["a", "b", "c"] {
            data.insert(id, constant(1.0, 4));
        }
        let err = DtwKmeans::new(3).with_seed(3).fit(&data).unwrap_err();
        assert_eq!(err, Error::EmptyCluster { cluster: 1, round: 1 });
    }

    #[test]
    fn test_failed_round_leaves_model_untouched() {
        let mut data = BTreeMap::new();
        for id in ["a", "b", "c"] {
            data.insert(id, constant(1.0, 4));
        }
        let engine = DtwKmeans::new(3).with_seed(3);
        let mut model = engine.initialize(&data).unwrap();
        let before = model.clone();
        assert!(engine.step(&mut model, &data, &mut ()).is_err());
        assert_eq!(model, before);

        // Caller-side policy: reseed the losing centroids far away and retry.
        model.reseed(1, constant(50.0, 4)).unwrap();
        model.reseed(2, constant(-50.0, 4)).unwrap();
        data.insert("d", constant(50.0, 4));
        data.insert("e", constant(-50.0, 4));
        engine.step(&mut model, &data, &mut ()).unwrap();
        assert_eq!(model.cluster_sizes(), vec![3, 1, 1]);
    }

    #[test]
    fn test_later_round_failure_keeps_completed_rounds() {
        let mut data = BTreeMap::new();
        data.insert("zeros", constant(0.0, 5));
        data.insert("tens", constant(10.0, 5));
        let engine = DtwKmeans::new(2).with_seed(7);
        let mut model = engine.initialize(&data).unwrap();
        engine.step(&mut model, &data, &mut ()).unwrap();
        let after_first = model.clone();

        // Both series now sit next to the zero centroid, so the other one empties.
        data.insert("tens", constant(0.1, 5));
        let err = engine.step(&mut model, &data, &mut ()).unwrap_err();
        assert!(matches!(err, Error::EmptyCluster { round: 2, .. }), "{err:?}");
        assert_eq!(model, after_first);
        assert_eq!(model.rounds_completed(), 1);
    }

    #[test]
    fn test_insufficient_data() {
        let mut data = BTreeMap::new();
        data.insert("only", constant(0.0, 3));
        assert_eq!(
            DtwKmeans::new(2).fit(&data).unwrap_err(),
            Error::InsufficientData {
                requested: 2,
                available: 1
            }
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let mut data = BTreeMap::new();
        data.insert("a", constant(0.0, 5));
        data.insert("b", constant(1.0, 4));
        let err = DtwKmeans::new(1).fit(&data).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                series: "b".to_string(),
                expected: (5, 1),
                found: (4, 1)
            }
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let data = two_groups();
        assert!(DtwKmeans::new(0).fit(&data).is_err());
        assert!(DtwKmeans::new(2).with_n_iter(0).fit(&data).is_err());
    }

    #[test]
    fn test_unassignable_series() {
        let mut data = BTreeMap::new();
        data.insert("ok", constant(0.0, 3));
        data.insert("nan", Series::univariate(vec![f64::NAN; 3]).unwrap());
        let err = DtwKmeans::new(1).with_seed(0).fit(&data).unwrap_err();
        assert!(matches!(err, Error::UnassignableSeries { .. }));
    }

    #[test]
    fn test_observer_sees_rounds_in_order() {
        let data = two_groups();
        let mut recorder = Recorder::default();
        DtwKmeans::new(2)
            .with_n_iter(2)
            .with_seed(5)
            .fit_with_observer(&data, &mut recorder)
            .unwrap();
        assert_eq!(
            recorder.events,
            vec![
                ("start", 1),
                ("assigned", 1),
                ("updated", 1),
                ("start", 2),
                ("assigned", 2),
                ("updated", 2),
            ]
        );
    }

    #[test]
    fn test_stop_on_stable() {
        let data = two_groups();
        let fixed = DtwKmeans::new(2).with_n_iter(8).with_seed(11).fit(&data).unwrap();
        assert_eq!(fixed.rounds_completed(), 8);

        let early = DtwKmeans::new(2)
            .with_n_iter(8)
            .with_seed(11)
            .with_stop_on_stable(true)
            .fit(&data)
            .unwrap();
        assert!(early.rounds_completed() < 8);
        assert!(!early.history().last().unwrap().assignment_changed);
        assert_eq!(early.labels(), fixed.labels());
    }

    #[test]
    fn test_pruning_skips_dtw() {
        let data = two_groups();
        let model = DtwKmeans::new(2).with_n_iter(2).with_seed(42).fit(&data).unwrap();
        let last = model.history().last().unwrap();
        assert_eq!(last.dtw_evaluations + last.lb_pruned, data.len() * 2);
        assert!(last.lb_pruned > 0);
    }

    #[test]
    fn test_fit_predict_in_input_order() {
        let data: Vec<Series> = vec![
            constant(0.0, 4),
            constant(10.0, 4),
            constant(0.2, 4),
            constant(10.2, 4),
        ];
        let model = DtwKmeans::new(2).with_seed(42);
        let labels = model.fit_predict(&data).unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[1], labels[3]);
        assert_ne!(labels[0], labels[1]);
        assert_eq!(model.n_clusters(), 2);
    }
}
