//! End-to-end tests: JSON in, records through the store, JSON back out.
mod common;
use common::*;
use seqgraph::prelude::*;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_read_sample_json() {
    let root = NodeReader::default()
        .read_str(SAMPLE_SEQUENCE_JSON)
        .expect("Failed to read sequence JSON");

    assert_eq!(root.kind(), NodeKind::Sequence);
    assert_eq!(root.body().len(), 4);
    assert_eq!(root.node_count(), 7);

    let location = root.body()[0]
        .arg("location")
        .and_then(Value::as_node)
        .expect("location is a node");
    assert_eq!(location.kind(), NodeKind::Identifier);
    assert_eq!(
        location.arg("label"),
        Some(&Value::Scalar(Scalar::ident("parent")))
    );

    assert_eq!(
        root.body()[2].arg("milliseconds"),
        Some(&Value::Scalar(Scalar::Number(1500.5)))
    );
    assert_eq!(
        root.body()[3].arg("label"),
        Some(&Value::Scalar(Scalar::from("soil")))
    );
}

#[test]
fn test_json_round_trip() {
    let reader = NodeReader::default();
    let root = reader.read_str(SAMPLE_SEQUENCE_JSON).unwrap();
    let again = reader.read_value(&root.to_json()).unwrap();
    assert_eq!(again, root);

    let sample = create_sample_sequence();
    assert_eq!(reader.read_value(&sample.to_json()).unwrap(), sample);
}

#[test]
fn test_to_json_layout() {
    let sequence = create_sequence(vec![wait(500)]);
    assert_eq!(
        sequence.root().to_json(),
        json!({
            "kind": "sequence",
            "args": {},
            "body": [
                { "kind": "wait", "args": { "milliseconds": 500 } }
            ]
        })
    );
}

#[test]
fn test_unknown_kind_is_rejected() {
    let result = NodeReader::default().read_str(r#"{ "kind": "teleport", "args": {} }"#);
    assert_eq!(result, Err(NodeError::UnknownKind("teleport".to_string())));
}

#[test]
fn test_kind_alias() {
    let reader = NodeReader::builder()
        .with_kind_alias("pause", NodeKind::Wait)
        .build();
    let root = reader
        .read_str(r#"{ "kind": "pause", "args": { "milliseconds": 20 } }"#)
        .unwrap();
    assert_eq!(root, wait(20));
    assert_eq!(root.to_json()["kind"], json!("wait"));
}

#[test]
fn test_malformed_json_is_rejected() {
    let reader = NodeReader::default();
    assert!(matches!(reader.read_str("{ not json"), Err(NodeError::Json(_))));
    assert!(matches!(reader.read_str("[1, 2]"), Err(NodeError::Json(_))));
    assert!(matches!(
        reader.read_str(r#"{ "kind": "wait", "args": { "milliseconds": null } }"#),
        Err(NodeError::Json(_))
    ));
}

#[test]
fn test_shape_errors_surface_while_reading() {
    let result = NodeReader::default().read_str(r#"{ "kind": "wait", "args": {} }"#);
    assert_eq!(
        result,
        Err(NodeError::MissingArg {
            kind: NodeKind::Wait,
            slot: "milliseconds".to_string(),
        })
    );
}

#[test]
fn test_edit_save_and_reload() {
    let root = NodeReader::default().read_str(SAMPLE_SEQUENCE_JSON).unwrap();
    let sequence = Sequence::new(SequenceId(11), "Imported", root).unwrap();
    let store = MemoryStore::new();
    store.save_sequence(&sequence).unwrap();

    let photo = Arc::clone(&sequence.body()[1]);
    let moved = move_step(&photo, &sequence, APPEND, Origin::Body(1)).unwrap();
    let edited = splice(Arc::new(wait(100)), &moved, 0).unwrap();
    store.save_sequence(&edited).unwrap();

    let reloaded = store.load_sequence(SequenceId(11)).unwrap();
    assert_eq!(reloaded, *edited.root());
    let kinds: Vec<NodeKind> = reloaded.body().iter().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Wait,
            NodeKind::MoveAbsolute,
            NodeKind::Wait,
            NodeKind::ReadPin,
            NodeKind::TakePhoto,
        ]
    );
}

#[test]
fn test_pipeline_preserves_every_node() {
    let root = create_sample_sequence();
    let entries = flatten(&root);
    assert_eq!(entries.len(), root.node_count());

    let mut pass = SecondPass::new(SequenceId(1), SequentialIds::starting_at(100));
    let primaries = pass.run(entries).unwrap();
    assert_eq!(primaries.len(), root.node_count());
    assert_eq!(primaries[0].id, PrimaryId(100));

    let rebuilt = reconstruct(primaries[0].id, &primaries, pass.edges()).unwrap();
    assert_eq!(rebuilt, root);
    assert_eq!(
        DisplayNode { node: &rebuilt }.to_string(),
        DisplayNode { node: &root }.to_string()
    );
}
