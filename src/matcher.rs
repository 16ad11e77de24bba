//! Owned reference set, tree and metric: the serving-side handle.

use crate::error::Error;
use crate::metric::{AngularCosine, Metric};
use crate::tree::{Neighbor, VpTree};

#[cfg(feature = "serde")]
use crate::artifact::Artifact;

/// A stroke matcher that owns its reference polylines and index.
///
/// Built once — offline via [`Matcher::build`], or at startup from a
/// persisted [`Artifact`](crate::Artifact) — and then held as read-only
/// state for the life of the process. All query methods take `&self`, so a
/// matcher wrapped in an `Arc` serves any number of concurrent callers
/// without locking. To re-index, build a fresh matcher in isolation and
/// swap the `Arc`; never mutate one that may be queried.
///
/// # Example
///
/// ```
/// use strokesearch::{AngularCosine, Matcher};
///
/// let refs = vec![
///     vec![-250.0, -250.0, 0.0, 0.0, 250.0, 250.0],
///     vec![-250.0, 250.0, 0.0, 0.0, 250.0, -250.0],
/// ];
/// let matcher = Matcher::build(refs, AngularCosine, 10).unwrap();
///
/// let hit = matcher.nearest(&[-250.0, -245.0, 1.0, 0.0, 250.0, 251.0]).unwrap();
/// assert_eq!(hit.index, 0);
/// ```
pub struct Matcher<M: Metric> {
    polylines: Vec<Vec<f64>>,
    tree: VpTree,
    metric: M,
}

/// Matcher over the angular stroke dissimilarity, the common case.
pub type AngularMatcher = Matcher<AngularCosine>;

impl<M: Metric> Matcher<M> {
    /// Index `polylines` and take ownership of both halves.
    pub fn build(polylines: Vec<Vec<f64>>, metric: M, leaf_capacity: usize) -> Result<Self, Error> {
        let tree = VpTree::build(&polylines, &metric, leaf_capacity)?;
        Ok(Self {
            polylines,
            tree,
            metric,
        })
    }

    /// Reassemble a matcher from a persisted artifact without recomputing
    /// any distance.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedArtifact`] when the artifact fails validation.
    #[cfg(feature = "serde")]
    pub fn from_artifact(artifact: Artifact, metric: M) -> Result<Self, Error> {
        let (polylines, tree) = artifact.decode()?;
        Ok(Self {
            polylines,
            tree,
            metric,
        })
    }

    /// Package the reference set and index for persistence.
    #[cfg(feature = "serde")]
    pub fn to_artifact(&self) -> Result<Artifact, Error> {
        Artifact::encode(&self.polylines, &self.tree)
    }

    /// The closest reference shape to `query`.
    #[inline]
    pub fn nearest(&self, query: &[f64]) -> Result<Neighbor, Error> {
        self.tree.nearest(&self.polylines, &self.metric, query)
    }

    /// The `k` closest reference shapes to `query`, ascending by distance.
    #[inline]
    pub fn knearest(&self, query: &[f64], k: usize) -> Result<Vec<Neighbor>, Error> {
        self.tree.knearest(&self.polylines, &self.metric, query, k)
    }

    /// The reference polyline behind a matched position, for mapping results
    /// back to display assets.
    #[inline]
    pub fn polyline(&self, index: usize) -> Option<&[f64]> {
        self.polylines.get(index).map(Vec::as_slice)
    }

    #[inline]
    pub fn tree(&self) -> &VpTree {
        &self.tree
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Fixed point-sequence length queries must match.
    #[inline]
    pub fn dim(&self) -> usize {
        self.tree.dim()
    }
}
