//! Tests for the flattening pass.
mod common;
use common::*;
use seqgraph::prelude::*;

#[test]
fn test_flatten_emits_one_entry_per_node() {
    let root = create_sample_sequence();
    let entries = flatten(&root);
    assert_eq!(entries.len(), root.node_count());
}

#[test]
fn test_flatten_is_pre_order() {
    let entries = flatten(&create_sample_sequence());
    let kinds: Vec<NodeKind> = entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Sequence,
            NodeKind::MoveAbsolute,
            NodeKind::Point,
            NodeKind::Coordinate,
            NodeKind::Loop,
            NodeKind::WritePin,
            NodeKind::Wait,
            NodeKind::If,
            NodeKind::Nothing,
            NodeKind::Execute,
            NodeKind::SendMessage,
            NodeKind::Channel,
        ]
    );

    let ids: Vec<usize> = entries.iter().map(|e| e.temp_id.0).collect();
    assert_eq!(ids, (0..12).collect::<Vec<usize>>());
}

#[test]
fn test_owners_precede_their_entries() {
    let entries = flatten(&create_sample_sequence());
    assert!(entries[0].owner.is_none());
    for (index, entry) in entries.iter().enumerate().skip(1) {
        let owner = entry.owner.as_ref().expect("non-root entry has an owner");
        let owner_index = entries
            .iter()
            .position(|e| e.temp_id == owner.temp_id)
            .unwrap();
        assert!(owner_index < index);
    }
}

#[test]
fn test_body_children_record_their_positions() {
    let entries = flatten(&create_sample_sequence());
    let root_id = entries[0].temp_id;
    let slots: Vec<&Slot> = entries
        .iter()
        .filter_map(|e| e.owner.as_ref())
        .filter(|o| o.temp_id == root_id)
        .map(|o| &o.slot)
        .collect();
    assert_eq!(
        slots,
        vec![&Slot::Body(0), &Slot::Body(1), &Slot::Body(2), &Slot::Body(3)]
    );
}

#[test]
fn test_sub_node_args_become_references() {
    let entries = flatten(&move_to_plant(9));
    assert_eq!(entries.len(), 3);

    let mover = &entries[0];
    assert_eq!(mover.args.get("location"), Some(&FlatArg::Ref(TempId(1))));
    assert_eq!(mover.args.get("offset"), Some(&FlatArg::Ref(TempId(2))));
    assert_eq!(
        mover.args.get("speed"),
        Some(&FlatArg::Scalar(Scalar::Number(100.0)))
    );

    assert_eq!(
        entries[1].owner,
        Some(Owner {
            temp_id: TempId(0),
            slot: Slot::Arg("location".to_string()),
        })
    );
    assert_eq!(
        entries[1].args.get("pointer_id"),
        Some(&FlatArg::Scalar(Scalar::Number(9.0)))
    );
}

#[test]
fn test_flatten_is_deterministic() {
    let root = create_sample_sequence();
    assert_eq!(flatten(&root), flatten(&root));
}

#[test]
fn test_flat_entry_display() {
    let entries = flatten(&move_to_plant(9));
    assert_eq!(
        entries[0].to_string(),
        "t0 move_absolute {location: &t1, offset: &t2, speed: 100}"
    );
    assert_eq!(
        entries[2].to_string(),
        "t2 coordinate <- t0.offset {x: 0, y: 0, z: 50}"
    );
}

#[test]
fn test_long_body_keeps_every_position() {
    let steps: Vec<Node> = (0..300).map(wait).collect();
    let sequence = create_sequence(steps);
    let entries = flatten(sequence.root());
    assert_eq!(entries.len(), 301);

    for (index, entry) in entries.iter().enumerate().skip(1) {
        assert_eq!(entry.temp_id, TempId(index));
        assert_eq!(
            entry.owner,
            Some(Owner {
                temp_id: TempId(0),
                slot: Slot::Body(index - 1),
            })
        );
    }
}

#[test]
fn test_deeply_nested_loops_round_trip() {
    let mut node = wait(1);
    for _ in 0..500 {
        node = Node::builder(NodeKind::Loop)
            .arg("times", 2)
            .step(node)
            .build()
            .unwrap();
    }
    let root = create_sequence(vec![node]);

    let entries = flatten(root.root());
    assert_eq!(entries.len(), 502);
    assert_eq!(entries[501].owner.as_ref().map(|o| o.temp_id), Some(TempId(500)));

    let (primaries, edges) = materialize(root.root());
    let rebuilt = reconstruct(primaries[0].id, &primaries, &edges).unwrap();
    assert_eq!(rebuilt, *root.root());
}
