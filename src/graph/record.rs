use crate::ast::{NodeKind, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId(pub u64);

/// Durable id of a [`PrimaryNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimaryId(pub u64);

/// Durable id of an [`EdgeNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq#{}", self.0)
    }
}

impl fmt::Display for PrimaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// The persisted identity of one node. Carries no structure; that lives in edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryNode {
    pub id: PrimaryId,
    pub kind: NodeKind,
    pub owner_sequence_id: SequenceId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Body,
    Arg,
}

/// Where an edge attaches to its owner: a body position or an argument name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSlot {
    Body(usize),
    Arg(String),
}

impl fmt::Display for EdgeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeSlot::Body(position) => write!(f, "body[{}]", position),
            EdgeSlot::Arg(name) => write!(f, "arg '{}'", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeTarget {
    Node(PrimaryId),
    Literal(Scalar),
}

/// One typed, ordered relationship between a primary record and its child
/// record or literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeNode {
    pub id: EdgeId,
    pub owner_primary_id: PrimaryId,
    pub slot: EdgeSlot,
    pub target: EdgeTarget,
}

impl EdgeNode {
    pub fn edge_type(&self) -> EdgeType {
        match self.slot {
            EdgeSlot::Body(_) => EdgeType::Body,
            EdgeSlot::Arg(_) => EdgeType::Arg,
        }
    }

    pub fn target_primary_id(&self) -> Option<PrimaryId> {
        match &self.target {
            EdgeTarget::Node(id) => Some(*id),
            EdgeTarget::Literal(_) => None,
        }
    }

    pub fn literal_value(&self) -> Option<&Scalar> {
        match &self.target {
            EdgeTarget::Literal(value) => Some(value),
            EdgeTarget::Node(_) => None,
        }
    }
}

/// Allocates durable record ids.
pub trait IdSource {
    fn next_primary_id(&mut self) -> PrimaryId;
    fn next_edge_id(&mut self) -> EdgeId;
}

impl<T: IdSource + ?Sized> IdSource for &mut T {
    fn next_primary_id(&mut self) -> PrimaryId {
        (**self).next_primary_id()
    }

    fn next_edge_id(&mut self) -> EdgeId {
        (**self).next_edge_id()
    }
}

/// A simple counter-backed id source, starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next_primary: u64,
    next_edge: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next_primary: first,
            next_edge: first,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_primary_id(&mut self) -> PrimaryId {
        let id = self.next_primary;
        self.next_primary += 1;
        PrimaryId(id)
    }

    fn next_edge_id(&mut self) -> EdgeId {
        let id = self.next_edge;
        self.next_edge += 1;
        EdgeId(id)
    }
}

/// A thread-safe id source; shared by reference between concurrent runs.
#[derive(Debug)]
pub struct AtomicIds {
    next_primary: AtomicU64,
    next_edge: AtomicU64,
}

impl AtomicIds {
    pub fn starting_at(next_primary: u64, next_edge: u64) -> Self {
        Self {
            next_primary: AtomicU64::new(next_primary),
            next_edge: AtomicU64::new(next_edge),
        }
    }

    pub(crate) fn peek(&self) -> (u64, u64) {
        (
            self.next_primary.load(Ordering::Relaxed),
            self.next_edge.load(Ordering::Relaxed),
        )
    }
}

impl Default for AtomicIds {
    fn default() -> Self {
        Self::starting_at(1, 1)
    }
}

impl IdSource for &AtomicIds {
    fn next_primary_id(&mut self) -> PrimaryId {
        PrimaryId(self.next_primary.fetch_add(1, Ordering::Relaxed))
    }

    fn next_edge_id(&mut self) -> EdgeId {
        EdgeId(self.next_edge.fetch_add(1, Ordering::Relaxed))
    }
}
