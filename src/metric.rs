//! Stroke dissimilarity metrics.
//!
//! The vantage-point tree is generic over [`Metric`], so any pairwise
//! dissimilarity can drive it; [`AngularCosine`] is the one used for stroke
//! matching, and [`MetricFn`] adapts an arbitrary closure.

use core::f64::consts::FRAC_PI_2;

use crate::error::Error;

/// Distance function over equal-length point sequences.
///
/// Point sequences are flat `[x0, y0, x1, y1, ...]` slices. Callers inside
/// this crate validate that both inputs share one even, non-zero length
/// before evaluating the metric, so implementations may assume equal-length
/// inputs. Implementations must be pure: the same pair of slices always
/// yields the same value, and evaluation has no side effects, so one metric
/// instance may serve any number of concurrent queries.
pub trait Metric: Send + Sync {
    /// Dissimilarity between `a` and `b`. Must be non-negative.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

/// Adapter implementing [`Metric`] for a plain function or closure.
///
/// This is the substitution point for experimenting with other
/// dissimilarities without touching any tree logic.
///
/// # Example
///
/// ```
/// use strokesearch::{MetricFn, VpTree};
///
/// let euclidean = MetricFn(|a: &[f64], b: &[f64]| {
///     a.iter()
///         .zip(b)
///         .map(|(x, y)| (x - y) * (x - y))
///         .sum::<f64>()
///         .sqrt()
/// });
///
/// let refs = vec![vec![0.0, 0.0], vec![3.0, 4.0]];
/// let tree = VpTree::build(&refs, &euclidean, 10).unwrap();
/// let hit = tree.nearest(&refs, &euclidean, &[2.9, 4.1]).unwrap();
/// assert_eq!(hit.index, 1);
/// ```
pub struct MetricFn<F>(pub F);

impl<F> Metric for MetricFn<F>
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        (self.0)(a, b)
    }
}

/// Angular dissimilarity between two stroke polylines.
///
/// Accumulates a complex correlation across corresponding points: `dot`
/// collects `x1*x2 + y1*y2` and `cross` collects `x1*y2 - y1*x2`. Together
/// the two sums describe the least-squares rigid rotation relating the two
/// strokes, and the returned value `acos(dot / |(dot, cross)|)` in `[0, π]`
/// is the magnitude of that rotation angle: identical or uniformly
/// co-rotated strokes measure `0`, mirrored strokes measure `π`. Scaling
/// either stroke leaves the value unchanged; absolute position must already
/// be normalized away upstream.
///
/// When `dot` is exactly `0` the strokes are in quadrature and no single
/// rotation angle fits better than another; the value is defined as `π/2`
/// instead of dividing by zero.
///
/// This score is not a true metric: distinct shapes can measure `0`, and
/// the triangle inequality can fail on adversarial inputs (see
/// `triangle_inequality_can_fail` in the tests below). [`crate::VpTree`]
/// pruning is exact for metrics honoring the triangle inequality; under
/// this score, results on pathological data should be treated as
/// approximate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngularCosine;

impl Metric for AngularCosine {
    #[inline]
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "sequences must share one length");
        correlation_angle(a, b)
    }
}

/// Checked form of [`AngularCosine`].
///
/// Rejects inputs of differing length and lengths that are odd or zero,
/// then evaluates the angular dissimilarity.
///
/// # Example
///
/// ```
/// use strokesearch::angular_cosine;
///
/// let line = [-1.0, -1.0, 0.0, 0.0, 1.0, 1.0];
/// assert_eq!(angular_cosine(&line, &line).unwrap(), 0.0);
/// assert!(angular_cosine(&line, &line[..4]).is_err());
/// ```
pub fn angular_cosine(a: &[f64], b: &[f64]) -> Result<f64, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() || a.len() % 2 != 0 {
        return Err(Error::InvalidSequenceLength(a.len()));
    }
    Ok(correlation_angle(a, b))
}

#[inline]
fn correlation_angle(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut cross = 0.0;
    for (p, q) in a.chunks_exact(2).zip(b.chunks_exact(2)) {
        dot += p[0] * q[0] + p[1] * q[1];
        cross += p[0] * q[1] - p[1] * q[0];
    }

    // Quadrature: no best-fit rotation angle is defined.
    if dot == 0.0 {
        return FRAC_PI_2;
    }

    let magnitude = (dot * dot + cross * cross).sqrt();
    // The clamp absorbs floating-point overshoot before acos.
    (dot / magnitude).clamp(-1.0, 1.0).acos()
}
