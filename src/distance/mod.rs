//! Shape-aware distances between time series.
//!
//! Three layers, leaves first:
//!
//! - [`squared_euclidean`]: pointwise cost between two feature vectors.
//! - [`dtw_distance`]: Dynamic Time Warping over whole series, optionally
//!   restricted to a locality window around the diagonal.
//! - [`lb_keogh`] / [`Envelope`]: a cheap lower bound on windowed DTW, used to
//!   skip exact DTW evaluations that cannot win.
//!
//! ## Dynamic Time Warping
//!
//! DTW aligns two sequences by allowing local stretching and compression of the
//! time axis. With `cost(i, j)` the cheapest alignment of the prefixes ending
//! at `i` and `j`:
//!
//! ```text
//! cost(i, j) = d(s1[i], s2[j]) + min(cost(i-1, j), cost(i, j-1), cost(i-1, j-1))
//! ```
//!
//! where `d` is the squared Euclidean distance. The reported distance is
//! `sqrt(cost(n-1, m-1))`.
//!
//! ## LB_Keogh
//!
//! For every step of the query, build the min/max envelope of the candidate
//! over a window of radius `r` and sum the squared excursions of the query
//! outside it. Any warping path restricted to the same window must pay at
//! least that much, so `lb_keogh(q, c, r) <= dtw(q, c, Some(r))` for
//! equal-length series.
//!
//! ## Usage
//!
//! ```rust
//! use tsclump::distance::{dtw_distance, lb_keogh};
//! use tsclump::Series;
//!
//! let a = Series::univariate(vec![0.0, 0.0, 0.0]).unwrap();
//! let b = Series::univariate(vec![1.0, 1.0, 1.0]).unwrap();
//!
//! let d = dtw_distance(&a, &b, None).unwrap();
//! assert!((d - 3f64.sqrt()).abs() < 1e-12);
//! assert!(lb_keogh(&a, &b, 2).unwrap() <= dtw_distance(&a, &b, Some(2)).unwrap());
//! ```

mod dtw;
mod envelope;

pub use dtw::dtw_distance;
pub use envelope::{lb_keogh, Envelope};

use crate::error::{Error, Result};

/// Squared Euclidean distance between two feature vectors (not square-rooted).
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(sq_dist(a, b))
}

/// Unchecked kernel for callers that validated dimensions up front.
#[inline]
pub(crate) fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
