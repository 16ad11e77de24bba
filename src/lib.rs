//! # strokesearch
//!
//! Nearest-shape search for hand-drawn strokes: an angular stroke
//! dissimilarity plus a vantage-point tree that answers nearest and
//! k-nearest queries over a fixed reference set of polylines using only
//! pairwise distances.
//!
//! ## Quick Start
//!
//! ```rust
//! use strokesearch::{AngularCosine, Matcher};
//!
//! // Three reference strokes of three points each: a rising line, a
//! // falling line and a U-shaped curve.
//! let refs = vec![
//!     vec![-250.0, -250.0, 0.0, 0.0, 250.0, 250.0],
//!     vec![-250.0, 250.0, 0.0, 0.0, 250.0, -250.0],
//!     vec![-250.0, 250.0, 0.0, -250.0, 250.0, 250.0],
//! ];
//! let matcher = Matcher::build(refs, AngularCosine, 10).unwrap();
//!
//! // A slightly shaky rising line still matches the rising line.
//! let hit = matcher
//!     .nearest(&[-248.0, -251.0, 2.0, -1.0, 249.0, 252.0])
//!     .unwrap();
//! assert_eq!(hit.index, 0);
//! assert!(hit.distance < 0.05);
//! ```
//!
//! ## Components
//!
//! - [`metric`]: the [`AngularCosine`] stroke dissimilarity, the [`Metric`]
//!   trait the tree is generic over, and the [`MetricFn`] closure adapter.
//! - [`tree`]: the external-keys [`VpTree`] — construction, pruned
//!   k-nearest search and structural validation. Point data stays with the
//!   caller.
//! - [`Matcher`]: an owned bundle of reference polylines, tree and metric —
//!   the read-only handle a serving process holds.
//! - [`Artifact`] (`serde` feature, on by default): the persisted JSON
//!   document pairing the polylines with the serialized tree, so startup
//!   never recomputes a distance.
//!
//! ## Features
//!
//! - `serde` (default): serde derives on the tree types, plus the
//!   [`Artifact`] document and JSON encode/decode.
//! - `rkyv`: zero-copy archiving of [`VpTree`].
//! - `parallel`: rayon-backed distance passes during construction.
//!
//! ## Concurrency
//!
//! Trees and matchers are immutable after construction and safe to share
//! across threads without locking; each query keeps its candidate set on
//! its own stack. To re-index, build a new matcher and atomically swap the
//! shared handle (e.g. an `Arc`).

pub mod error;
pub mod matcher;
pub mod metric;
pub mod tree;

#[cfg(feature = "serde")]
pub mod artifact;

pub use error::Error;
pub use matcher::{AngularMatcher, Matcher};
pub use metric::{AngularCosine, Metric, MetricFn, angular_cosine};
pub use tree::{Builder, DEFAULT_LEAF_CAPACITY, Neighbor, VpTree};

#[cfg(feature = "serde")]
pub use artifact::Artifact;
