//! Tests for the in-memory graph store and its snapshots.
mod common;
use common::*;
use seqgraph::prelude::*;
use std::sync::Arc;
use std::thread;

fn named_sequence(id: u64, steps: Vec<Node>) -> Sequence {
    let root = Node::builder(NodeKind::Sequence)
        .steps(steps)
        .build()
        .unwrap();
    Sequence::new(SequenceId(id), format!("Sequence {}", id), root).unwrap()
}

#[test]
fn test_save_and_load_round_trip() {
    let store = MemoryStore::new();
    let root = create_sample_sequence();
    let sequence = Sequence::new(SequenceId(1), "Sample", root.clone()).unwrap();

    let graph = store.save_sequence(&sequence).expect("Failed to save");
    assert_eq!(graph.primaries.len(), 12);
    assert_eq!(graph.edges.len(), 30);
    assert_eq!(graph.root, graph.primaries[0].id);

    let loaded = store.load_sequence(SequenceId(1)).expect("Failed to load");
    assert_eq!(loaded, root);
}

#[test]
fn test_save_replaces_graph_wholesale() {
    let store = MemoryStore::new();
    let first = store
        .save_sequence(&named_sequence(1, vec![wait(1), wait(2), wait(3)]))
        .unwrap();
    let second = store
        .save_sequence(&named_sequence(1, vec![wait(4)]))
        .unwrap();

    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(second.primaries.len(), 2);
    assert!(second
        .primaries
        .iter()
        .all(|p| first.primaries.iter().all(|old| old.id != p.id)));

    let current = store.graph(SequenceId(1)).unwrap().unwrap();
    assert!(Arc::ptr_eq(&current, &second));
    assert_eq!(
        store.load_sequence(SequenceId(1)).unwrap(),
        *named_sequence(1, vec![wait(4)]).root()
    );
}

#[test]
fn test_records_belong_to_their_sequence() {
    let store = MemoryStore::new();
    let graph = store
        .save_sequence(&named_sequence(8, vec![move_to_plant(2)]))
        .unwrap();
    assert!(graph
        .primaries
        .iter()
        .all(|p| p.owner_sequence_id == SequenceId(8)));
}

#[test]
fn test_missing_sequence_is_not_found() {
    let store = MemoryStore::new();
    assert!(store.graph(SequenceId(4)).unwrap().is_none());
    assert!(matches!(
        store.load_sequence(SequenceId(4)),
        Err(StoreError::NotFound(SequenceId(4)))
    ));
}

#[test]
fn test_delete_sequence() {
    let store = MemoryStore::new();
    store.save_sequence(&named_sequence(1, vec![wait(1)])).unwrap();
    store.save_sequence(&named_sequence(2, vec![wait(2)])).unwrap();

    assert!(store.delete_sequence(SequenceId(1)).unwrap());
    assert!(!store.delete_sequence(SequenceId(1)).unwrap());
    assert_eq!(store.len().unwrap(), 1);
    assert!(store.load_sequence(SequenceId(2)).is_ok());
}

#[test]
fn test_snapshot_round_trip() {
    let store = MemoryStore::new();
    store
        .save_sequence(&Sequence::new(SequenceId(1), "Sample", create_sample_sequence()).unwrap())
        .unwrap();
    store
        .save_sequence(&named_sequence(2, vec![wait(10), move_to_plant(5)]))
        .unwrap();

    let bytes = store.to_bytes().expect("Failed to encode");
    let restored = MemoryStore::from_bytes(&bytes).expect("Failed to decode");

    assert_eq!(restored.len().unwrap(), 2);
    for id in [SequenceId(1), SequenceId(2)] {
        assert_eq!(
            restored.graph(id).unwrap().unwrap(),
            store.graph(id).unwrap().unwrap()
        );
        assert_eq!(
            restored.load_sequence(id).unwrap(),
            store.load_sequence(id).unwrap()
        );
    }

    // Ids keep counting past what the snapshot already used.
    let used = store.graph(SequenceId(2)).unwrap().unwrap();
    let fresh = restored
        .save_sequence(&named_sequence(3, vec![wait(1)]))
        .unwrap();
    let highest = used.primaries.iter().map(|p| p.id).max().unwrap();
    assert!(fresh.primaries.iter().all(|p| p.id > highest));
}

#[test]
fn test_corrupt_snapshot_is_rejected() {
    assert!(matches!(
        MemoryStore::from_bytes(&[0xff, 0xff, 0xff]),
        Err(StoreError::Snapshot(_))
    ));
}

#[test]
fn test_concurrent_saves_of_distinct_sequences() {
    let store = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (1..=8u64)
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let steps = (0..id as i32).map(wait).collect();
                store.save_sequence(&named_sequence(id, steps)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 8);
    for id in 1..=8u64 {
        let loaded = store.load_sequence(SequenceId(id)).unwrap();
        assert_eq!(loaded.body().len(), id as usize);
    }
}

#[test]
fn test_concurrent_saves_of_same_sequence_leave_one_complete_graph() {
    let store = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (1..=6i32)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let steps = (0..n).map(wait).collect();
                store.save_sequence(&named_sequence(1, steps)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let graph = store.graph(SequenceId(1)).unwrap().unwrap();
    let steps = graph.primaries.len() - 1;
    assert!((1..=6).contains(&steps));
    // One body edge and one literal edge per step, all from a single save.
    assert_eq!(graph.edges.len(), steps * 2);
    let rebuilt = graph.reconstruct().unwrap();
    assert_eq!(rebuilt, *named_sequence(1, (0..steps as i32).map(wait).collect()).root());
}

#[test]
fn test_writer_locks_are_released() {
    let store = MemoryStore::new();
    assert!(!store.delete_sequence(SequenceId(42)).unwrap());
    assert_eq!(store.pending_writes().unwrap(), 0);

    for id in 1..=20u64 {
        store.save_sequence(&named_sequence(id, vec![wait(1)])).unwrap();
    }
    assert_eq!(store.pending_writes().unwrap(), 0);

    for id in 1..=20u64 {
        assert!(store.delete_sequence(SequenceId(id)).unwrap());
    }
    assert_eq!(store.pending_writes().unwrap(), 0);
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_writer_locks_are_released_after_concurrent_saves() {
    let store = Arc::new(MemoryStore::new());
    let handles: Vec<_> = (0..16u64)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let id = n % 4 + 1;
                store.save_sequence(&named_sequence(id, vec![wait(n as i32)])).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 4);
    assert_eq!(store.pending_writes().unwrap(), 0);
}
