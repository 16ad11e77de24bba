//! Tree construction: recursive median partitioning of the reference set.

use crate::metric::Metric;
use crate::tree::node::Node;

#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 512;

/// Build the node arena in pre-order over all of `data`.
///
/// The vantage shape of every partition is the first element of the current
/// subset in reference-set order: fully deterministic and free of extra
/// distance evaluations. Child subsets are ordered by ascending distance to
/// the parent vantage, so deeper vantages tend toward central elements.
pub(crate) fn build_nodes<P, M>(data: &[P], metric: &M, leaf_capacity: usize) -> Vec<Node>
where
    P: AsRef<[f64]>,
    M: Metric,
{
    let mut nodes = Vec::new();
    grow(&mut nodes, data, metric, (0..data.len()).collect(), leaf_capacity);
    nodes
}

fn grow<P, M>(
    nodes: &mut Vec<Node>,
    data: &[P],
    metric: &M,
    subset: Vec<usize>,
    leaf_capacity: usize,
) -> usize
where
    P: AsRef<[f64]>,
    M: Metric,
{
    if subset.len() <= leaf_capacity {
        nodes.push(Node::Leaf { items: subset });
        return nodes.len() - 1;
    }

    let vantage = subset[0];
    let vantage_points = data[vantage].as_ref();
    let mut ranked: Vec<(f64, usize)> = subset[1..]
        .iter()
        .map(|&s| (metric.distance(vantage_points, data[s].as_ref()), s))
        .collect();
    ranked.sort_unstable_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

    let (threshold, inside, outside) = split(&ranked);

    // Reserve the parent slot so the arena stays in pre-order.
    let at = nodes.len();
    nodes.push(Node::Leaf { items: Vec::new() });
    let inside_child = grow(nodes, data, metric, inside, leaf_capacity);
    let outside_child = grow(nodes, data, metric, outside, leaf_capacity);
    nodes[at] = Node::Internal {
        vantage,
        threshold,
        inside: inside_child,
        outside: outside_child,
    };
    at
}

/// Median split of distance-ranked positions, with fallbacks for degenerate
/// distance distributions.
///
/// The threshold is the lower median, so the inside side always contains at
/// least the median element. When every distance ties at the threshold the
/// split degenerates (the outside side comes up empty) and a size split of
/// the ranked order restores progress; a single remaining element keeps an
/// empty outside leaf.
fn split(ranked: &[(f64, usize)]) -> (f64, Vec<usize>, Vec<usize>) {
    let threshold = ranked[(ranked.len() - 1) / 2].0;
    let cut = ranked.partition_point(|r| r.0 <= threshold);
    let cut = if cut < ranked.len() {
        cut
    } else if ranked.len() >= 2 {
        ranked.len() / 2
    } else {
        1
    };
    (
        threshold,
        ranked[..cut].iter().map(|r| r.1).collect(),
        ranked[cut..].iter().map(|r| r.1).collect(),
    )
}

#[cfg(feature = "parallel")]
pub(crate) fn build_nodes_parallel<P, M>(
    data: &[P],
    metric: &M,
    leaf_capacity: usize,
) -> Vec<Node>
where
    P: AsRef<[f64]> + Sync,
    M: Metric,
{
    let mut nodes = Vec::new();
    grow_parallel(
        &mut nodes,
        data,
        metric,
        (0..data.len()).collect(),
        leaf_capacity,
    );
    nodes
}

/// Like [`grow`], but fans the distance pass out across the rayon pool for
/// large subsets. The arena emission itself stays sequential so node order
/// is identical to the serial build.
#[cfg(feature = "parallel")]
fn grow_parallel<P, M>(
    nodes: &mut Vec<Node>,
    data: &[P],
    metric: &M,
    subset: Vec<usize>,
    leaf_capacity: usize,
) -> usize
where
    P: AsRef<[f64]> + Sync,
    M: Metric,
{
    use rayon::prelude::*;

    if subset.len() <= leaf_capacity {
        nodes.push(Node::Leaf { items: subset });
        return nodes.len() - 1;
    }

    let vantage = subset[0];
    let vantage_points = data[vantage].as_ref();
    let mut ranked: Vec<(f64, usize)> = if subset.len() >= PARALLEL_THRESHOLD {
        subset[1..]
            .par_iter()
            .map(|&s| (metric.distance(vantage_points, data[s].as_ref()), s))
            .collect()
    } else {
        subset[1..]
            .iter()
            .map(|&s| (metric.distance(vantage_points, data[s].as_ref()), s))
            .collect()
    };
    ranked.sort_unstable_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

    let (threshold, inside, outside) = split(&ranked);

    let at = nodes.len();
    nodes.push(Node::Leaf { items: Vec::new() });
    let inside_child = grow_parallel(nodes, data, metric, inside, leaf_capacity);
    let outside_child = grow_parallel(nodes, data, metric, outside, leaf_capacity);
    nodes[at] = Node::Internal {
        vantage,
        threshold,
        inside: inside_child,
        outside: outside_child,
    };
    at
}
