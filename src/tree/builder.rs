use crate::error::Error;
use crate::metric::Metric;
use crate::tree::vptree::VpTree;

/// Default number of reference shapes a leaf may hold before it is split.
pub const DEFAULT_LEAF_CAPACITY: usize = 10;

/// Builder for constructing vantage-point trees with custom parameters.
///
/// # Example
///
/// ```
/// use strokesearch::{AngularCosine, tree::Builder};
///
/// let refs: Vec<Vec<f64>> = (0..32)
///     .map(|i| {
///         let t = i as f64 * 0.19;
///         vec![t.cos(), t.sin()]
///     })
///     .collect();
///
/// let tree = Builder::new()
///     .leaf_capacity(4)
///     .build(&refs, &AngularCosine)
///     .unwrap();
///
/// assert_eq!(tree.len(), 32);
/// assert_eq!(tree.leaf_capacity(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    leaf_capacity: usize,
    #[cfg(feature = "parallel")]
    parallel: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            #[cfg(feature = "parallel")]
            parallel: false,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest subset stored directly in a leaf (clamped to >= 1).
    pub fn leaf_capacity(mut self, leaf_capacity: usize) -> Self {
        self.leaf_capacity = leaf_capacity.max(1);
        self
    }

    #[cfg(feature = "parallel")]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build<P, M>(&self, data: &[P], metric: &M) -> Result<VpTree, Error>
    where
        P: AsRef<[f64]> + Sync,
        M: Metric,
    {
        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                return VpTree::build_parallel(data, metric, self.leaf_capacity);
            }
        }

        VpTree::build(data, metric, self.leaf_capacity)
    }
}
