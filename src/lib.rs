//! Shape-aware clustering of multivariate time series.
//!
//! `tsclump` groups whole time series (for example one per asset, with price-change
//! ratio, volume, high and low per step) into `k` clusters:
//! - [`distance`]: squared Euclidean kernel, DTW with an optional locality window,
//!   LB_Keogh lower bound
//! - [`cluster`]: DTW k-means with LB_Keogh pruning, fixed round budget, and
//!   per-round observer hooks

#![forbid(unsafe_code)]

pub mod cluster;
pub mod distance;
pub mod error;
pub mod series;

pub use cluster::{
    ClusterModel, DtwKmeans, ProgressLogger, RoundObserver, RoundStats, SeriesClustering,
};
pub use distance::{dtw_distance, lb_keogh, squared_euclidean, Envelope};
pub use error::{Error, Result};
pub use series::Series;
