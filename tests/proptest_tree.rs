use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strokesearch::{AngularCosine, Metric, MetricFn, VpTree, angular_cosine};

fn euclidean() -> MetricFn<fn(&[f64], &[f64]) -> f64> {
    fn distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
    MetricFn(distance)
}

/// Linear-scan oracle: every reference ranked by `(distance, position)`.
fn scan<M: Metric>(refs: &[Vec<f64>], metric: &M, query: &[f64]) -> Vec<(f64, usize)> {
    let mut ranked: Vec<(f64, usize)> = refs
        .iter()
        .enumerate()
        .map(|(i, stroke)| (metric.distance(query, stroke), i))
        .collect();
    ranked.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
    ranked
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Under a metric that honors the triangle inequality, pruned search must
    // agree exactly with a full scan, including tie order.
    #[test]
    fn knearest_matches_linear_scan_under_euclidean(
        refs in prop::collection::vec(prop::collection::vec(-100.0f64..100.0, 6), 1..50),
        query in prop::collection::vec(-100.0f64..100.0, 6),
        k in 1usize..8,
        leaf_capacity in 1usize..6,
    ) {
        let metric = euclidean();
        let tree = VpTree::build(&refs, &metric, leaf_capacity).unwrap();
        let found = tree.knearest(&refs, &metric, &query, k).unwrap();
        let ranked = scan(&refs, &metric, &query);

        prop_assert_eq!(found.len(), k.min(refs.len()));
        for (neighbor, (distance, index)) in found.iter().zip(&ranked) {
            prop_assert_eq!(neighbor.index, *index);
            prop_assert_eq!(neighbor.distance, *distance);
        }
    }

    #[test]
    fn knearest_results_are_sorted_and_in_bounds(
        refs in prop::collection::vec(prop::collection::vec(-250.0f64..250.0, 6), 1..60),
        query in prop::collection::vec(-250.0f64..250.0, 6),
        k in 1usize..10,
    ) {
        let tree = VpTree::build(&refs, &AngularCosine, 5).unwrap();
        let found = tree.knearest(&refs, &AngularCosine, &query, k).unwrap();

        prop_assert_eq!(found.len(), k.min(refs.len()));
        for pair in found.windows(2) {
            prop_assert!(
                pair[0].distance < pair[1].distance
                    || (pair[0].distance == pair[1].distance && pair[0].index < pair[1].index)
            );
        }
        let mut seen = vec![false; refs.len()];
        for neighbor in &found {
            prop_assert!(neighbor.index < refs.len());
            prop_assert!(!seen[neighbor.index], "duplicate result index");
            seen[neighbor.index] = true;
            prop_assert!((0.0..=core::f64::consts::PI).contains(&neighbor.distance));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn roundtrip_build_serialize_deserialize_query(
        refs in prop::collection::vec(prop::collection::vec(-250.0f64..250.0, 4), 1..40),
        query in prop::collection::vec(-250.0f64..250.0, 4),
        k in 1usize..6,
    ) {
        let tree = VpTree::build(&refs, &AngularCosine, 3).unwrap();
        let text = tree.to_json().unwrap();
        let de = VpTree::from_json(&text, &refs).unwrap();

        prop_assert_eq!(&tree, &de);
        prop_assert_eq!(
            tree.knearest(&refs, &AngularCosine, &query, k).unwrap(),
            de.knearest(&refs, &AngularCosine, &query, k).unwrap()
        );
    }

    #[test]
    fn metric_is_reflexive_symmetric_and_bounded(
        a in prop::collection::vec(-250.0f64..250.0, 6),
        b in prop::collection::vec(-250.0f64..250.0, 6),
    ) {
        prop_assume!(a.iter().any(|v| *v != 0.0));

        // Not exactly zero in general: sqrt(dot * dot) can land one ulp off
        // `dot`, and acos amplifies that to ~1e-8 near cosine 1.
        let self_distance = angular_cosine(&a, &a).unwrap();
        prop_assert!(self_distance.abs() < 1e-7);

        let d = angular_cosine(&a, &b).unwrap();
        prop_assert!((0.0..=core::f64::consts::PI).contains(&d));
        prop_assert_eq!(d, angular_cosine(&b, &a).unwrap());
    }
}

// Single unit-circle points reduce the angular score to circular arc
// distance — a true metric — so tree search must agree exactly with a full
// scan for 100 randomized queries.
#[test]
fn angular_top1_matches_linear_scan_on_unit_points() {
    let mut rng = StdRng::seed_from_u64(7);
    let refs: Vec<Vec<f64>> = (0..64)
        .map(|_| {
            let t: f64 = rng.gen_range(0.0..core::f64::consts::TAU);
            vec![t.cos(), t.sin()]
        })
        .collect();
    let tree = VpTree::build(&refs, &AngularCosine, 4).unwrap();

    for i in 0..100 {
        let t: f64 = rng.gen_range(0.0..core::f64::consts::TAU);
        let query = vec![t.cos(), t.sin()];

        let got = tree.nearest(&refs, &AngularCosine, &query).unwrap();
        let ranked = scan(&refs, &AngularCosine, &query);
        assert_eq!(got.index, ranked[0].1, "query {i}");
        assert_eq!(got.distance, ranked[0].0);
    }
}

#[test]
fn identical_references_terminate_and_rank_by_position() {
    let refs: Vec<Vec<f64>> = (0..40).map(|_| vec![3.0, -1.0, 7.0, 2.0]).collect();
    let tree = VpTree::build(&refs, &AngularCosine, 4).unwrap();
    tree.check(&refs).unwrap();

    let found = tree
        .knearest(&refs, &AngularCosine, &[3.0, -1.0, 7.0, 2.0], 5)
        .unwrap();
    assert_eq!(
        found.iter().map(|n| n.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
}
