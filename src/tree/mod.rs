//! Vantage-point tree: a metric-space nearest-neighbor index over stroke
//! polylines.
//!
//! Built once over a reference set (see [`Builder`] or [`VpTree::build`]),
//! the tree then answers any number of concurrent nearest/k-nearest queries
//! using only pairwise distances — no coordinate embedding is required, so
//! any [`crate::Metric`] can drive it. The tree stores positions into the
//! reference set rather than copies of the data; the reference set must
//! outlive the tree and be passed back to the query methods.

pub(crate) mod builder;
pub(crate) mod partition;

pub mod neighbors;
pub mod node;
pub mod vptree;

pub use builder::{Builder, DEFAULT_LEAF_CAPACITY};
pub use neighbors::Neighbor;
pub use node::Node;
pub use vptree::VpTree;
