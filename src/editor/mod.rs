//! Structural editing of a sequence's top-level body.
//!
//! Every operation takes an immutable [`Sequence`] snapshot and returns a new
//! one. Steps are shared `Arc<Node>`s: a spliced or moved step is the very
//! same node in the result, never a copy.

use crate::ast::{Node, NodeKind};
use crate::error::EditError;
use crate::graph::SequenceId;
use std::sync::Arc;

pub mod transfer;

pub use transfer::{DataTransfer, DropIntent, TransferKey, TransferRegistry, on_drop};

/// Index sentinel meaning "insert at the end".
pub const APPEND: usize = usize::MAX;

/// A named command program rooted at a `sequence` node.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub id: SequenceId,
    pub name: String,
    root: Node,
}

impl Sequence {
    pub fn new(id: SequenceId, name: impl Into<String>, root: Node) -> Result<Self, EditError> {
        if root.kind() != NodeKind::Sequence {
            return Err(EditError::NotASequence(root.kind()));
        }
        Ok(Self {
            id,
            name: name.into(),
            root,
        })
    }

    /// A sequence with no steps.
    pub fn empty(id: SequenceId, name: impl Into<String>) -> Result<Self, EditError> {
        let root = Node::builder(NodeKind::Sequence).build()?;
        Self::new(id, name, root)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn body(&self) -> &[Arc<Node>] {
        self.root.body()
    }

    fn with_body(&self, body: Vec<Arc<Node>>) -> Result<Self, EditError> {
        Ok(Self {
            id: self.id,
            name: self.name.clone(),
            root: self.root.with_body(body)?,
        })
    }
}

/// Where a dragged step comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A position in the destination sequence's own body.
    Body(usize),
    /// A template list such as the command palette. The source is not consumed.
    Palette,
}

/// Inserts `step` at `index`, shifting later steps right.
///
/// An index at or past the end of the body (including [`APPEND`]) appends.
pub fn splice(step: Arc<Node>, sequence: &Sequence, index: usize) -> Result<Sequence, EditError> {
    let mut body = sequence.body().to_vec();
    let index = index.min(body.len());
    body.insert(index, step);
    tracing::trace!(sequence = %sequence.id, index, len = body.len(), "spliced step");
    sequence.with_body(body)
}

/// Moves `step` to position `to` of `sequence`'s body.
///
/// For [`Origin::Body`] the step is removed from `from` and reinserted so that
/// it ends up at index `to` of the resulting body (clamped to its end). A step
/// from the [`Origin::Palette`] is inserted without touching any source.
pub fn move_step(
    step: &Arc<Node>,
    sequence: &Sequence,
    to: usize,
    from: Origin,
) -> Result<Sequence, EditError> {
    let from = match from {
        Origin::Palette => return splice(Arc::clone(step), sequence, to),
        Origin::Body(from) => from,
    };

    let mut body = sequence.body().to_vec();
    let current = body.get(from).ok_or(EditError::IndexOutOfRange {
        index: from,
        len: body.len(),
    })?;
    if !Arc::ptr_eq(current, step) && current != step {
        return Err(EditError::StepMismatch { index: from });
    }

    let moved = body.remove(from);
    let to = to.min(body.len());
    body.insert(to, moved);
    tracing::trace!(sequence = %sequence.id, from, to, "moved step");
    sequence.with_body(body)
}
