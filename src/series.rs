//! Multivariate time series storage.
//!
//! A [`Series`] is an ordered sequence of time steps, each one a fixed-length
//! feature vector (for an asset: price-change ratio, volume, high, low, ...).
//! Values are stored row-major in one contiguous buffer so that a time step is
//! a plain `&[f64]` slice.

use crate::error::{Error, Result};

/// An immutable multivariate time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    dim: usize,
}

// Construction rejects empty series, so there is no `is_empty`.
#[allow(clippy::len_without_is_empty)]
impl Series {
    /// Build a series from a row-major buffer of `len * dim` values.
    pub fn new(values: Vec<f64>, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidParameter {
                name: "dim",
                message: "must be at least 1",
            });
        }
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        if values.len() % dim != 0 {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: values.len() % dim,
            });
        }
        Ok(Self { values, dim })
    }

    /// Build a series from one feature vector per time step.
    ///
    /// Every step must have the same number of features as the first one.
    pub fn from_steps(steps: Vec<Vec<f64>>) -> Result<Self> {
        let dim = steps.first().map(Vec::len).ok_or(Error::EmptyInput)?;
        let mut values = Vec::with_capacity(steps.len() * dim);
        for step in steps {
            if step.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: step.len(),
                });
            }
            values.extend(step);
        }
        Self::new(values, dim)
    }

    /// Build a single-feature series.
    pub fn univariate(values: Vec<f64>) -> Result<Self> {
        Self::new(values, 1)
    }

    /// Number of time steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Number of features per time step.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `(len, dim)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.dim)
    }

    /// Feature vector at time step `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn step(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterate over the time steps in order.
    pub fn steps(&self) -> std::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.dim)
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
