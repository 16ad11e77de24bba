#![cfg(feature = "serde")]

use strokesearch::{AngularCosine, Artifact, Error, Matcher, VpTree};

fn stroke_refs(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.37;
            vec![
                t.cos() * 250.0,
                t.sin() * 250.0,
                (t + 0.9).cos() * 140.0,
                (t + 0.9).sin() * 140.0,
                (t * 2.1).cos() * 60.0,
                (t * 2.1).sin() * 60.0,
            ]
        })
        .collect()
}

fn queries() -> Vec<Vec<f64>> {
    (0..10)
        .map(|i| {
            let t = i as f64 * 0.71 + 0.05;
            vec![
                t.cos() * 240.0,
                t.sin() * 240.0,
                (t + 1.1).cos() * 130.0,
                (t + 1.1).sin() * 130.0,
                (t * 1.9).cos() * 75.0,
                (t * 1.9).sin() * 75.0,
            ]
        })
        .collect()
}

#[test]
fn serde_roundtrip_tree() {
    let refs = stroke_refs(40);
    let tree = VpTree::build(&refs, &AngularCosine, 4).unwrap();

    let json = serde_json::to_string(&tree).unwrap();
    let de: VpTree = serde_json::from_str(&json).unwrap();

    assert_eq!(tree, de);
    assert_eq!(tree.len(), de.len());
    assert_eq!(tree.height(), de.height());
    assert_eq!(tree.node_count(), de.node_count());

    for query in queries() {
        for k in [1, 3, 7] {
            assert_eq!(
                tree.knearest(&refs, &AngularCosine, &query, k).unwrap(),
                de.knearest(&refs, &AngularCosine, &query, k).unwrap()
            );
        }
    }
}

#[test]
fn checked_roundtrip_via_to_json() {
    let refs = stroke_refs(25);
    let tree = VpTree::build(&refs, &AngularCosine, 3).unwrap();

    let text = tree.to_json().unwrap();
    let de = VpTree::from_json(&text, &refs).unwrap();
    assert_eq!(tree, de);
}

#[test]
fn from_json_rejects_mismatched_reference_set() {
    let refs = stroke_refs(25);
    let tree = VpTree::build(&refs, &AngularCosine, 3).unwrap();
    let text = tree.to_json().unwrap();

    let err = VpTree::from_json(&text, &refs[..20]).unwrap_err();
    assert!(matches!(err, Error::MalformedArtifact(_)));

    let err = VpTree::from_json("not json", &refs).unwrap_err();
    assert!(matches!(err, Error::MalformedArtifact(_)));
}

#[test]
fn from_json_rejects_structurally_invalid_trees() {
    let refs: Vec<Vec<f64>> = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![-1.0, 0.0]];

    let leaf_out_of_range =
        r#"{"leaf_capacity":10,"len":3,"dim":2,"nodes":[{"Leaf":{"items":[0,1,7]}}]}"#;
    assert!(matches!(
        VpTree::from_json(leaf_out_of_range, &refs).unwrap_err(),
        Error::MalformedArtifact(_)
    ));

    let vantage_out_of_range = r#"{"leaf_capacity":1,"len":3,"dim":2,"nodes":[
        {"Internal":{"vantage":9,"threshold":1.0,"inside":1,"outside":2}},
        {"Leaf":{"items":[1]}},{"Leaf":{"items":[2]}}]}"#;
    assert!(matches!(
        VpTree::from_json(vantage_out_of_range, &refs).unwrap_err(),
        Error::MalformedArtifact(_)
    ));

    let cyclic = r#"{"leaf_capacity":1,"len":3,"dim":2,"nodes":[
        {"Internal":{"vantage":0,"threshold":1.0,"inside":0,"outside":1}},
        {"Leaf":{"items":[1,2]}}]}"#;
    assert!(matches!(
        VpTree::from_json(cyclic, &refs).unwrap_err(),
        Error::MalformedArtifact(_)
    ));

    let orphaned =
        r#"{"leaf_capacity":10,"len":3,"dim":2,"nodes":[{"Leaf":{"items":[0,1,2]}},{"Leaf":{"items":[]}}]}"#;
    assert!(matches!(
        VpTree::from_json(orphaned, &refs).unwrap_err(),
        Error::MalformedArtifact(_)
    ));

    let child_out_of_bounds = r#"{"leaf_capacity":1,"len":3,"dim":2,"nodes":[
        {"Internal":{"vantage":0,"threshold":1.0,"inside":1,"outside":5}},
        {"Leaf":{"items":[1,2]}}]}"#;
    assert!(matches!(
        VpTree::from_json(child_out_of_bounds, &refs).unwrap_err(),
        Error::MalformedArtifact(_)
    ));
}

#[test]
fn serde_roundtrip_artifact() {
    let refs = stroke_refs(30);
    let artifact = Artifact::build(refs.clone(), &AngularCosine, 5).unwrap();

    let text = artifact.to_json().unwrap();
    let reloaded = Artifact::from_json(&text).unwrap();
    assert_eq!(artifact, reloaded);

    let built = Matcher::build(refs, AngularCosine, 5).unwrap();
    let loaded = Matcher::from_artifact(reloaded, AngularCosine).unwrap();
    for query in queries() {
        assert_eq!(
            built.knearest(&query, 5).unwrap(),
            loaded.knearest(&query, 5).unwrap()
        );
    }
}

#[test]
fn artifact_json_field_names_are_stable() {
    let artifact = Artifact::build(stroke_refs(8), &AngularCosine, 4).unwrap();
    let text = artifact.to_json().unwrap();
    assert!(text.contains("\"polylines\""));
    assert!(text.contains("\"vpTree\""));
}
