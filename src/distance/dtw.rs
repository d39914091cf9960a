//! Dynamic Time Warping with an optional locality window.

use super::sq_dist;
use crate::error::{Error, Result};
use crate::series::Series;

/// DTW distance between `s1` and `s2`.
///
/// Returns the square root of the accumulated squared-Euclidean cost along the
/// cheapest warping path.
///
/// # Window
///
/// `window = None` (or `Some(0)`) sweeps the full `n x m` table. `Some(w)`
/// first widens `w` to `max(w, |n - m|)`, then restricts row `i` to columns
/// `[max(0, i - w), min(m, i + w))`. The upper bound is exclusive, so when
/// `m > n` and `w == m - n` the last column is never reached and the result
/// is `f64::INFINITY`. Callers that need a finite result must pass a wider
/// window.
///
/// # Complexity
///
/// O(n·m) unconstrained, O(n·w) when windowed: only the cells a row leaves
/// behind outside the next band are reset. O(m) memory.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] if the series have different feature counts.
pub fn dtw_distance(s1: &Series, s2: &Series, window: Option<usize>) -> Result<f64> {
    if s1.dim() != s2.dim() {
        return Err(Error::DimensionMismatch {
            expected: s1.dim(),
            found: s2.dim(),
        });
    }

    let n = s1.len();
    let m = s2.len();
    let window = window.filter(|&w| w > 0).map(|w| w.max(n.abs_diff(m)));

    let band = |i: usize| match window {
        Some(w) => (i.saturating_sub(w), m.min(i.saturating_add(w))),
        None => (0, m),
    };

    // Column `j` of the table lives at offset `j + 1`; offset 0 is the `j = -1` boundary.
    // `prev` starts out as the `i = -1` boundary row.
    let mut prev = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;
    let mut cur = vec![f64::INFINITY; m + 1];

    // Each buffer is infinite outside the offsets its last row wrote.
    let mut prev_written = 0..1;
    let mut cur_written = 0..0;

    for i in 0..n {
        let (lo, hi) = band(i);
        let written = lo + 1..hi + 1;

        // `cur` still holds row i - 2. Clear what this row will not overwrite,
        // which includes the left neighbour `cur[lo]`.
        reset(&mut cur, cur_written.start, cur_written.end.min(written.start));
        reset(&mut cur, cur_written.start.max(written.end), cur_written.end);

        let a = s1.step(i);
        for j in lo..hi {
            let cost = sq_dist(a, s2.step(j));
            cur[j + 1] = cost + prev[j + 1].min(cur[j]).min(prev[j]);
        }

        std::mem::swap(&mut prev, &mut cur);
        cur_written = std::mem::replace(&mut prev_written, written);
    }

    Ok(prev[m].sqrt())
}

#[inline]
fn reset(row: &mut [f64], from: usize, to: usize) {
    if from < to {
        row[from..to].fill(f64::INFINITY);
    }
}
