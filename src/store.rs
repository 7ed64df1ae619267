//! An in-memory record store with wholesale, per-sequence graph replacement.
//!
//! Saving a sequence flattens and materializes it, then swaps the new graph in
//! under a single write lock, so readers see either the old graph or the new
//! one and never a half-replaced state. Saves of the same sequence are
//! serialized; saves of different sequences run independently.

use crate::editor::Sequence;
use crate::error::StoreError;
use crate::flat_ir::flatten;
use crate::graph::{AtomicIds, EdgeNode, PrimaryId, PrimaryNode, SecondPass, SequenceId, reconstruct};
use crate::ast::Node;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::{Arc, Mutex, RwLock};

/// The complete record set of one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGraph {
    pub root: PrimaryId,
    pub primaries: Vec<PrimaryNode>,
    pub edges: Vec<EdgeNode>,
}

impl StoredGraph {
    pub fn reconstruct(&self) -> Result<Node, StoreError> {
        Ok(reconstruct(self.root, &self.primaries, &self.edges)?)
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    next_primary: u64,
    next_edge: u64,
    graphs: Vec<(SequenceId, StoredGraph)>,
}

#[derive(Default)]
pub struct MemoryStore {
    graphs: RwLock<AHashMap<SequenceId, Arc<StoredGraph>>>,
    writers: Mutex<AHashMap<SequenceId, Arc<Mutex<()>>>>,
    ids: AtomicIds,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes `sequence` and replaces its stored graph wholesale.
    pub fn save_sequence(&self, sequence: &Sequence) -> Result<Arc<StoredGraph>, StoreError> {
        let writer = self.writer_for(sequence.id)?;
        let result = self.replace_graph(sequence, &writer);
        self.release_writer(sequence.id, writer)?;
        result
    }

    fn replace_graph(
        &self,
        sequence: &Sequence,
        writer: &Mutex<()>,
    ) -> Result<Arc<StoredGraph>, StoreError> {
        let _guard = writer.lock().map_err(|_| StoreError::LockPoisoned)?;

        let entries = flatten(sequence.root());
        let mut pass = SecondPass::new(sequence.id, &self.ids);
        let primaries = pass.run(entries)?;
        let root = primaries
            .first()
            .map(|p| p.id)
            .ok_or(StoreError::EmptyGraph(sequence.id))?;
        let graph = Arc::new(StoredGraph {
            root,
            primaries,
            edges: pass.into_edges(),
        });

        let previous = self
            .graphs
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(sequence.id, Arc::clone(&graph));
        tracing::debug!(
            sequence = %sequence.id,
            primaries = graph.primaries.len(),
            edges = graph.edges.len(),
            replaced = previous.is_some(),
            "stored sequence graph"
        );
        Ok(graph)
    }

    pub fn graph(&self, id: SequenceId) -> Result<Option<Arc<StoredGraph>>, StoreError> {
        let graphs = self.graphs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(graphs.get(&id).cloned())
    }

    /// Rebuilds the stored tree of a sequence.
    pub fn load_sequence(&self, id: SequenceId) -> Result<Node, StoreError> {
        self.graph(id)?.ok_or(StoreError::NotFound(id))?.reconstruct()
    }

    /// Removes a sequence's graph. Returns whether one was stored.
    pub fn delete_sequence(&self, id: SequenceId) -> Result<bool, StoreError> {
        if self.graph(id)?.is_none() {
            return Ok(false);
        }
        let writer = self.writer_for(id)?;
        let removed = writer
            .lock()
            .map_err(|_| StoreError::LockPoisoned)
            .and_then(|_guard| {
                Ok(self
                    .graphs
                    .write()
                    .map_err(|_| StoreError::LockPoisoned)?
                    .remove(&id))
            });
        self.release_writer(id, writer)?;
        Ok(removed?.is_some())
    }

    /// Number of sequences with a save or delete in progress.
    pub fn pending_writes(&self) -> Result<usize, StoreError> {
        Ok(self.writers.lock().map_err(|_| StoreError::LockPoisoned)?.len())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.graphs.read().map_err(|_| StoreError::LockPoisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Encodes every stored graph and the id counters with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        let graphs = self.graphs.read().map_err(|_| StoreError::LockPoisoned)?;
        let (next_primary, next_edge) = self.ids.peek();
        let mut stored: Vec<(SequenceId, StoredGraph)> = graphs
            .iter()
            .map(|(id, graph)| (*id, graph.as_ref().clone()))
            .collect();
        stored.sort_by_key(|(id, _)| *id);
        let snapshot = Snapshot {
            next_primary,
            next_edge,
            graphs: stored,
        };
        encode_to_vec(&snapshot, standard())
            .map_err(|e| StoreError::Snapshot(format!("Serialization failed: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let (snapshot, _): (Snapshot, usize) = decode_from_slice(bytes, standard())
            .map_err(|e| StoreError::Snapshot(format!("Deserialization failed: {}", e)))?;
        let graphs = snapshot
            .graphs
            .into_iter()
            .map(|(id, graph)| (id, Arc::new(graph)))
            .collect();
        Ok(Self {
            graphs: RwLock::new(graphs),
            writers: Mutex::new(AHashMap::new()),
            ids: AtomicIds::starting_at(snapshot.next_primary, snapshot.next_edge),
        })
    }

    /// Saves a snapshot of the store to a file.
    pub fn save(&self, path: &str) -> Result<(), StoreError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)
            .map_err(|e| StoreError::Snapshot(format!("Could not write to file '{}': {}", path, e)))
    }

    pub fn from_file(path: &str) -> Result<Self, StoreError> {
        let bytes = fs::read(path)
            .map_err(|e| StoreError::Snapshot(format!("Could not read file '{}': {}", path, e)))?;
        Self::from_bytes(&bytes)
    }

    fn writer_for(&self, id: SequenceId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut writers = self.writers.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Arc::clone(writers.entry(id).or_default()))
    }

    /// Drops the per-sequence writer lock once no other caller holds it.
    ///
    /// Handles are only cloned under the `writers` lock, so a count of two
    /// (the map and `writer`) means nobody else is waiting on it.
    fn release_writer(&self, id: SequenceId, writer: Arc<Mutex<()>>) -> Result<(), StoreError> {
        let mut writers = self.writers.lock().map_err(|_| StoreError::LockPoisoned)?;
        let idle = writers
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, &writer) && Arc::strong_count(&writer) == 2);
        if idle {
            writers.remove(&id);
        }
        Ok(())
    }
}
