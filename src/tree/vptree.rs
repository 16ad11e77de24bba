//! External-keys vantage-point tree.
//!
//! The tree stores only structure: vantage positions, split thresholds and
//! leaf membership. The point data is owned by the caller and passed back to
//! the query methods, so one reference set can back several trees and the
//! serialized form stays small.

use crate::error::Error;
use crate::metric::Metric;
use crate::tree::neighbors::{KNearest, Neighbor};
use crate::tree::node::Node;
use crate::tree::partition::build_nodes;

/// A vantage-point tree over a fixed reference set of stroke polylines.
///
/// The tree enables sub-linear nearest-neighbor search using only pairwise
/// distances, so it works for dissimilarities that have no coordinate
/// embedding. It does not own the reference set: build it over a slice of
/// polylines, keep that slice alive, and pass the same slice to every query.
///
/// Read-only after construction. Queries take `&self` and keep all working
/// state on their own stack, so a tree (together with its reference set) can
/// be shared across any number of threads without locking. To re-index,
/// build a new tree in isolation and swap the shared handle; never mutate
/// one that may be queried.
///
/// # Example
///
/// ```
/// use strokesearch::{AngularCosine, VpTree};
///
/// let refs: Vec<Vec<f64>> = (0..64)
///     .map(|i| {
///         let t = i as f64 * 0.098;
///         vec![t.cos(), t.sin()]
///     })
///     .collect();
///
/// let tree = VpTree::build(&refs, &AngularCosine, 8).unwrap();
/// let hit = tree.nearest(&refs, &AngularCosine, &refs[17]).unwrap();
/// assert_eq!(hit.index, 17);
/// assert!(hit.distance < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct VpTree {
    leaf_capacity: usize,
    len: usize,
    dim: usize,
    nodes: Vec<Node>,
}

impl VpTree {
    /// Build a tree over `data` with the given metric.
    ///
    /// Every entry of `data` must be a flat `[x0, y0, x1, y1, ...]` slice of
    /// one shared even, non-zero length. `leaf_capacity` bounds how many
    /// shapes a leaf holds before it is split
    /// ([`crate::tree::DEFAULT_LEAF_CAPACITY`] is a practical default).
    ///
    /// Construction is deterministic: the same reference set, metric and
    /// capacity always produce the same tree.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] for an empty reference set,
    /// [`Error::InvalidLeafCapacity`] for a capacity of zero,
    /// [`Error::InvalidSequenceLength`] / [`Error::LengthMismatch`] for
    /// odd-length or inconsistent polylines.
    pub fn build<P, M>(data: &[P], metric: &M, leaf_capacity: usize) -> Result<Self, Error>
    where
        P: AsRef<[f64]>,
        M: Metric,
    {
        let dim = Self::check_data(data, leaf_capacity)?;
        Ok(Self {
            leaf_capacity,
            len: data.len(),
            dim,
            nodes: build_nodes(data, metric, leaf_capacity),
        })
    }

    /// Like [`VpTree::build`], but evaluates the per-node distance passes on
    /// the rayon pool. Produces a tree identical to the serial build.
    #[cfg(feature = "parallel")]
    pub fn build_parallel<P, M>(data: &[P], metric: &M, leaf_capacity: usize) -> Result<Self, Error>
    where
        P: AsRef<[f64]> + Sync,
        M: Metric,
    {
        use crate::tree::partition::build_nodes_parallel;

        let dim = Self::check_data(data, leaf_capacity)?;
        Ok(Self {
            leaf_capacity,
            len: data.len(),
            dim,
            nodes: build_nodes_parallel(data, metric, leaf_capacity),
        })
    }

    fn check_data<P: AsRef<[f64]>>(data: &[P], leaf_capacity: usize) -> Result<usize, Error> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        if leaf_capacity == 0 {
            return Err(Error::InvalidLeafCapacity);
        }

        let dim = data[0].as_ref().len();
        if dim == 0 || dim % 2 != 0 {
            return Err(Error::InvalidSequenceLength(dim));
        }
        for entry in data {
            let len = entry.as_ref().len();
            if len != dim {
                return Err(Error::LengthMismatch {
                    expected: dim,
                    actual: len,
                });
            }
        }
        Ok(dim)
    }

    /// Find the single nearest reference shape to `query`.
    ///
    /// `data` must be the reference set the tree was built over.
    #[inline]
    pub fn nearest<P, M>(&self, data: &[P], metric: &M, query: &[f64]) -> Result<Neighbor, Error>
    where
        P: AsRef<[f64]>,
        M: Metric,
    {
        let found = self.knearest(data, metric, query, 1)?;
        Ok(found[0])
    }

    /// Find the `k` nearest reference shapes to `query`, ascending by
    /// distance with ties broken by reference-set position.
    ///
    /// Returns fewer than `k` results only when the reference set holds
    /// fewer than `k` shapes. `data` must be the reference set the tree was
    /// built over.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidK`] for `k == 0`, [`Error::LengthMismatch`] when the
    /// query's length differs from the reference set's.
    pub fn knearest<P, M>(
        &self,
        data: &[P],
        metric: &M,
        query: &[f64],
        k: usize,
    ) -> Result<Vec<Neighbor>, Error>
    where
        P: AsRef<[f64]>,
        M: Metric,
    {
        if k == 0 {
            return Err(Error::InvalidK);
        }
        if query.len() != self.dim {
            return Err(Error::LengthMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        debug_assert_eq!(data.len(), self.len, "query against a different reference set");

        let mut found = KNearest::new(k.min(self.len));
        self.descend(0, data, metric, query, &mut found);
        Ok(found.into_sorted())
    }

    fn descend<P, M>(
        &self,
        at: usize,
        data: &[P],
        metric: &M,
        query: &[f64],
        found: &mut KNearest,
    ) where
        P: AsRef<[f64]>,
        M: Metric,
    {
        match &self.nodes[at] {
            Node::Leaf { items } => {
                for &item in items {
                    found.offer(item, metric.distance(query, data[item].as_ref()));
                }
            }
            Node::Internal {
                vantage,
                threshold,
                inside,
                outside,
            } => {
                let d = metric.distance(query, data[*vantage].as_ref());
                found.offer(*vantage, d);

                // A subtree is skipped only when the distance bounds prove
                // it cannot hold anything better than the current k-th best.
                // The side the query falls on is visited first so the bound
                // tightens before the far side is considered.
                if d <= *threshold {
                    if d - found.worst() <= *threshold {
                        self.descend(*inside, data, metric, query, found);
                    }
                    if d + found.worst() >= *threshold {
                        self.descend(*outside, data, metric, query, found);
                    }
                } else {
                    if d + found.worst() >= *threshold {
                        self.descend(*outside, data, metric, query, found);
                    }
                    if d - found.worst() <= *threshold {
                        self.descend(*inside, data, metric, query, found);
                    }
                }
            }
        }
    }

    /// Number of reference shapes the tree was built over.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed point-sequence length shared by the reference set and queries.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of node levels from the root down to the deepest leaf.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((at, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Internal {
                inside, outside, ..
            } = &self.nodes[at]
            {
                stack.push((*inside, depth + 1));
                stack.push((*outside, depth + 1));
            }
        }
        deepest
    }

    /// Approximate memory usage in bytes.
    pub fn size_in_bytes(&self) -> usize {
        let leaves: usize = self
            .nodes
            .iter()
            .map(|node| match node {
                Node::Leaf { items } => items.capacity() * core::mem::size_of::<usize>(),
                Node::Internal { .. } => 0,
            })
            .sum();
        core::mem::size_of::<Self>() + self.nodes.capacity() * core::mem::size_of::<Node>() + leaves
    }

    /// Validate the tree's structure against the reference set it is meant
    /// to serve.
    ///
    /// Walks the arena from the root and checks that every child position is
    /// in bounds and reached exactly once (single root, no cycles, no
    /// orphans), that every stored reference-set position is in range, and
    /// that thresholds are finite and non-negative. Used by
    /// [`VpTree::from_json`] and by artifact loading; a tree that fails here
    /// must not be queried.
    pub fn check<P: AsRef<[f64]>>(&self, data: &[P]) -> Result<(), Error> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.len != data.len() {
            return Err(Error::MalformedArtifact(format!(
                "tree was built over {} shapes, reference set has {}",
                self.len,
                data.len()
            )));
        }
        let dim = data[0].as_ref().len();
        if self.dim != dim {
            return Err(Error::MalformedArtifact(format!(
                "tree expects sequences of length {}, reference set has {dim}",
                self.dim
            )));
        }
        if self.leaf_capacity == 0 {
            return Err(Error::MalformedArtifact(
                "leaf capacity of zero".to_string(),
            ));
        }
        if self.nodes.is_empty() {
            return Err(Error::MalformedArtifact("tree has no nodes".to_string()));
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(at) = stack.pop() {
            let node = self.nodes.get(at).ok_or_else(|| {
                Error::MalformedArtifact(format!("child position {at} out of bounds"))
            })?;
            if core::mem::replace(&mut visited[at], true) {
                return Err(Error::MalformedArtifact(format!(
                    "node {at} reached more than once"
                )));
            }
            node.check_positions(self.len)?;
            if let Node::Internal {
                inside, outside, ..
            } = node
            {
                stack.push(*inside);
                stack.push(*outside);
            }
        }
        if let Some(orphan) = visited.iter().position(|v| !v) {
            return Err(Error::MalformedArtifact(format!(
                "node {orphan} is unreachable from the root"
            )));
        }
        Ok(())
    }

    /// Encode the tree structure as JSON.
    ///
    /// The encoding lists the node arena in pre-order, so a round-trip
    /// through [`VpTree::from_json`] reproduces the tree exactly — same node
    /// kinds, vantage positions, thresholds and children — without
    /// recomputing a single distance.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::MalformedArtifact(e.to_string()))
    }

    /// Decode a tree from [`VpTree::to_json`] output and validate it against
    /// the reference set it will serve.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedArtifact`] when the text does not parse or the
    /// decoded structure fails [`VpTree::check`].
    #[cfg(feature = "serde")]
    pub fn from_json<P: AsRef<[f64]>>(text: &str, data: &[P]) -> Result<Self, Error> {
        let tree: Self =
            serde_json::from_str(text).map_err(|e| Error::MalformedArtifact(e.to_string()))?;
        tree.check(data)?;
        Ok(tree)
    }
}
