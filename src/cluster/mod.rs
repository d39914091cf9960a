//! Clustering whole time series by shape.
//!
//! This module groups multivariate time series (one per asset, say) into a
//! fixed number of clusters using DTW instead of plain Euclidean distance.
//!
//! ## Why DTW k-means
//!
//! Two price histories with the same rally shifted by a day are far apart in
//! Euclidean terms but close under DTW, which lets the time axis stretch
//! locally. K-means needs only two things from the metric: "which centroid is
//! nearest" and "what is the average of a cluster". DTW answers the first;
//! the second stays the plain elementwise mean because every series in a run
//! has the same length.
//!
//! ## Cost control
//!
//! Exact DTW is quadratic in series length (linear in the window when one is
//! set). Each centroid's LB_Keogh envelope is built once per round, and a
//! series only pays for DTW against a centroid whose lower bound is below the
//! best distance seen so far.
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use tsclump::cluster::DtwKmeans;
//! use tsclump::Series;
//!
//! let mut data = BTreeMap::new();
//! data.insert("AAA", Series::univariate(vec![0.0; 4]).unwrap());
//! data.insert("BBB", Series::univariate(vec![0.1; 4]).unwrap());
//! data.insert("CCC", Series::univariate(vec![9.0; 4]).unwrap());
//! data.insert("DDD", Series::univariate(vec![9.1; 4]).unwrap());
//!
//! let model = DtwKmeans::new(2).with_n_iter(5).with_seed(42).fit(&data).unwrap();
//! let labels = model.labels();
//! assert_eq!(labels["AAA"], labels["BBB"]);
//! assert_ne!(labels["AAA"], labels["CCC"]);
//! assert_eq!(model.centroids().len(), 2);
//! ```

mod dtw_kmeans;
mod model;
mod observer;
mod traits;

pub use dtw_kmeans::{DtwKmeans, DEFAULT_LB_RADIUS};
pub use model::{ClusterModel, RoundStats};
pub use observer::{ProgressLogger, RoundObserver};
pub use traits::SeriesClustering;
