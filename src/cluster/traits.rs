use crate::error::Result;
use crate::series::Series;

/// Common interface for hard clustering of whole series (one label per series).
pub trait SeriesClustering {
    /// Fit the model and return one cluster label per input series, in input order.
    fn fit_predict(&self, data: &[Series]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}
