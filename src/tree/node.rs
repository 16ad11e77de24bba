use crate::error::Error;

/// A node of the vantage-point tree.
///
/// Children are positions into the tree's node arena, which is laid out in
/// pre-order with the root at position 0. Reference shapes are identified by
/// their position in the reference set; the node never stores point data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub enum Node {
    /// Partition node. Shapes within `threshold` of the vantage shape live
    /// in the `inside` subtree, the rest in `outside`.
    Internal {
        vantage: usize,
        threshold: f64,
        inside: usize,
        outside: usize,
    },
    /// Terminal node holding reference-set positions directly.
    Leaf { items: Vec<usize> },
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Check the positions this node stores against the reference-set size.
    pub(crate) fn check_positions(&self, len: usize) -> Result<(), Error> {
        match self {
            Node::Leaf { items } => {
                for &item in items {
                    if item >= len {
                        return Err(Error::MalformedArtifact(format!(
                            "leaf holds out-of-range shape position {item} (reference set has {len})"
                        )));
                    }
                }
            }
            Node::Internal {
                vantage, threshold, ..
            } => {
                if *vantage >= len {
                    return Err(Error::MalformedArtifact(format!(
                        "vantage position {vantage} out of range (reference set has {len})"
                    )));
                }
                if !threshold.is_finite() || *threshold < 0.0 {
                    return Err(Error::MalformedArtifact(format!(
                        "split threshold {threshold} is not a finite, non-negative number"
                    )));
                }
            }
        }
        Ok(())
    }
}
