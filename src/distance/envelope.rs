//! Sliding min/max envelopes and the LB_Keogh lower bound.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::series::Series;

/// Per-step, per-feature min/max envelope of a candidate series.
///
/// For query step `i` the window over the candidate is `[max(0, i - r), min(i + r, m))`:
/// the upper end is exclusive, so the window is asymmetric and runs short at
/// the end of the candidate. An empty window (radius 0, or a query step past
/// the candidate's end) leaves the envelope unbounded at that step.
#[derive(Debug, Clone)]
pub struct Envelope {
    upper: Vec<f64>,
    lower: Vec<f64>,
    len: usize,
    dim: usize,
}

impl Envelope {
    /// Envelope of `candidate` for a query of `query_len` steps.
    ///
    /// O(query_len · dim) using monotonic deques, independent of `radius`.
    pub fn new(candidate: &Series, query_len: usize, radius: usize) -> Self {
        let dim = candidate.dim();
        let m = candidate.len();
        let data = candidate.as_slice();

        let mut upper = vec![f64::INFINITY; query_len * dim];
        let mut lower = vec![f64::NEG_INFINITY; query_len * dim];

        // Front of `max_q` is the window maximum (values decreasing front to back),
        // front of `min_q` the window minimum (values increasing).
        let mut max_q: VecDeque<usize> = VecDeque::new();
        let mut min_q: VecDeque<usize> = VecDeque::new();

        for f in 0..dim {
            let value = |j: usize| data[j * dim + f];
            max_q.clear();
            min_q.clear();
            let mut next = 0usize;

            for i in 0..query_len {
                let lo = i.saturating_sub(radius);
                let hi = m.min(i.saturating_add(radius));

                while next < hi {
                    let v = value(next);
                    while max_q.back().is_some_and(|&b| value(b) <= v) {
                        max_q.pop_back();
                    }
                    max_q.push_back(next);
                    while min_q.back().is_some_and(|&b| value(b) >= v) {
                        min_q.pop_back();
                    }
                    min_q.push_back(next);
                    next += 1;
                }

                while max_q.front().is_some_and(|&front| front < lo) {
                    max_q.pop_front();
                }
                while min_q.front().is_some_and(|&front| front < lo) {
                    min_q.pop_front();
                }

                if let (Some(&hi_idx), Some(&lo_idx)) = (max_q.front(), min_q.front()) {
                    upper[i * dim + f] = value(hi_idx);
                    lower[i * dim + f] = value(lo_idx);
                }
            }
        }

        Self {
            upper,
            lower,
            len: query_len,
            dim,
        }
    }

    /// LB_Keogh bound of `query` against this envelope.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if `query` does not have the `(len, dim)` the
    /// envelope was built for.
    pub fn lower_bound(&self, query: &Series) -> Result<f64> {
        if query.shape() != (self.len, self.dim) {
            return Err(Error::ShapeMismatch {
                series: "query".to_string(),
                expected: (self.len, self.dim),
                found: query.shape(),
            });
        }

        let sum: f64 = query
            .as_slice()
            .iter()
            .zip(self.upper.iter().zip(self.lower.iter()))
            .map(|(&q, (&u, &l))| {
                if q > u {
                    let d = q - u;
                    d * d
                } else if q < l {
                    let d = q - l;
                    d * d
                } else {
                    0.0
                }
            })
            .sum();

        Ok(sum.sqrt())
    }

    /// Upper envelope, row-major `len x dim`.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Lower envelope, row-major `len x dim`.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Number of query steps covered.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the envelope covers no steps.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// LB_Keogh lower bound on `dtw_distance(query, candidate, Some(radius))`.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] if the series have different feature counts.
pub fn lb_keogh(query: &Series, candidate: &Series, radius: usize) -> Result<f64> {
    if query.dim() != candidate.dim() {
        return Err(Error::DimensionMismatch {
            expected: query.dim(),
            found: candidate.dim(),
        });
    }
    Envelope::new(candidate, query.len(), radius).lower_bound(query)
}
