use thiserror::Error;

/// Errors returned by the distance kernels and the clustering engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Two feature vectors (or two series) have different dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A series does not have the `(len, dim)` shape fixed at the start of the run.
    #[error("shape mismatch for series {series}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Identifier of the offending series.
        series: String,
        /// Expected `(len, dim)`.
        expected: (usize, usize),
        /// Found `(len, dim)`.
        found: (usize, usize),
    },

    /// Fewer input series than requested clusters.
    #[error("insufficient data: requested {requested} clusters, but only {available} series")]
    InsufficientData {
        /// Requested number of clusters.
        requested: usize,
        /// Number of input series.
        available: usize,
    },

    /// A round finished with no members in some cluster.
    #[error("cluster {cluster} received no members in round {round}")]
    EmptyCluster {
        /// Index of the empty cluster.
        cluster: usize,
        /// 1-based round number.
        round: usize,
    },

    /// No centroid produced a finite distance to a series.
    #[error("series {series} has no finite distance to any centroid in round {round}")]
    UnassignableSeries {
        /// Identifier of the offending series.
        series: String,
        /// 1-based round number.
        round: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
