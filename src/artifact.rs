//! The persisted index document: reference polylines plus serialized tree.
//!
//! The on-disk shape is what the serving process consumes at startup: a JSON
//! object carrying the polylines in insertion order and the tree as an
//! opaque embedded string, so the index is never rebuilt (and no distance
//! recomputed) at load time.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::Error;
use crate::metric::Metric;
use crate::tree::VpTree;

/// Persisted artifact pairing a reference set with its serialized tree.
///
/// Produced once by an offline [`Artifact::build`] run, shipped as a single
/// JSON document, and unpacked at startup with [`Artifact::decode`] (or
/// [`Matcher::from_artifact`](crate::Matcher::from_artifact)). Loading
/// validates the document fully and refuses to serve anything malformed:
/// odd or inconsistent polyline lengths, an unparseable tree, or tree
/// positions out of range for the polyline list all fail with
/// [`Error::MalformedArtifact`].
///
/// # Example
///
/// ```
/// use strokesearch::{AngularCosine, Artifact, Matcher};
///
/// let refs = vec![
///     vec![-250.0, -250.0, 0.0, 0.0, 250.0, 250.0],
///     vec![-250.0, 250.0, 0.0, 0.0, 250.0, -250.0],
/// ];
///
/// // Offline.
/// let artifact = Artifact::build(refs, &AngularCosine, 10).unwrap();
/// let text = artifact.to_json().unwrap();
///
/// // At startup.
/// let artifact = Artifact::from_json(&text).unwrap();
/// let matcher = Matcher::from_artifact(artifact, AngularCosine).unwrap();
/// assert_eq!(matcher.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Artifact {
    /// Reference polylines, in the insertion order tree positions refer to.
    pub polylines: Vec<Vec<f64>>,
    /// Serialized tree, an opaque blob produced by [`VpTree::to_json`].
    #[serde(rename = "vpTree")]
    pub vp_tree: String,
}

impl Artifact {
    /// One-shot offline build: index `polylines` and package both halves.
    pub fn build<M: Metric>(
        polylines: Vec<Vec<f64>>,
        metric: &M,
        leaf_capacity: usize,
    ) -> Result<Self, Error> {
        let tree = VpTree::build(&polylines, metric, leaf_capacity)?;
        Ok(Self {
            vp_tree: tree.to_json()?,
            polylines,
        })
    }

    pub(crate) fn encode(polylines: &[Vec<f64>], tree: &VpTree) -> Result<Self, Error> {
        Ok(Self {
            polylines: polylines.to_vec(),
            vp_tree: tree.to_json()?,
        })
    }

    /// Validate the document and unpack it into the reference set and its
    /// tree.
    pub fn decode(self) -> Result<(Vec<Vec<f64>>, VpTree), Error> {
        self.check_polylines()?;
        let tree = VpTree::from_json(&self.vp_tree, &self.polylines)?;
        Ok((self.polylines, tree))
    }

    fn check_polylines(&self) -> Result<(), Error> {
        if self.polylines.is_empty() {
            return Err(Error::MalformedArtifact(
                "artifact holds no polylines".to_string(),
            ));
        }
        let dim = self.polylines[0].len();
        if dim == 0 || dim % 2 != 0 {
            return Err(Error::MalformedArtifact(format!(
                "polyline length {dim} is not an even, non-zero number"
            )));
        }
        for (i, line) in self.polylines.iter().enumerate() {
            if line.len() != dim {
                return Err(Error::MalformedArtifact(format!(
                    "polyline {i} has length {}, expected {dim}",
                    line.len()
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::MalformedArtifact(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::MalformedArtifact(e.to_string()))
    }

    /// Write the document to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let text = self
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(path, text)
    }

    /// Read a document from a file. Structural problems surface as
    /// `InvalidData` errors carrying the reason; call [`Artifact::decode`]
    /// afterwards for full validation against the embedded tree.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}
