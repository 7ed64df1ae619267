use super::record::{EdgeNode, EdgeSlot, EdgeTarget, PrimaryId, PrimaryNode, SequenceId};
use crate::ast::{Node, Value};
use crate::error::CorruptionError;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Rebuilds the node tree rooted at `root_id` from a sequence's records.
///
/// `primaries` and `edges` must be the complete record set of the sequence
/// that owns the root. Body edges are ordered by position; gaps are fine but a
/// repeated position is corruption, as is a repeated argument name, a missing
/// target, a record reached twice or a cycle.
///
/// Like [`crate::flat_ir::flatten`], the rebuild recurses once per level of
/// nesting, so extremely deep record graphs need a correspondingly large stack.
pub fn reconstruct(
    root_id: PrimaryId,
    primaries: &[PrimaryNode],
    edges: &[EdgeNode],
) -> Result<Node, CorruptionError> {
    let mut rebuilder = Rebuilder::new(primaries, edges);
    let root = rebuilder
        .primaries
        .get(&root_id)
        .copied()
        .ok_or(CorruptionError::MissingRoot(root_id))?;
    rebuilder.sequence_id = root.owner_sequence_id;
    rebuilder.visited.insert(root_id);

    let node = rebuilder.rebuild(root)?;

    let unreachable = primaries
        .iter()
        .filter(|p| !rebuilder.visited.contains(&p.id))
        .count();
    if unreachable > 0 {
        tracing::warn!(
            root = %root_id,
            unreachable,
            "record set contains primary records not reachable from the root"
        );
    }
    tracing::debug!(root = %root_id, nodes = rebuilder.visited.len(), "reconstructed node tree");
    Ok(node)
}

struct Rebuilder<'a> {
    primaries: AHashMap<PrimaryId, &'a PrimaryNode>,
    outgoing: AHashMap<PrimaryId, Vec<&'a EdgeNode>>,
    sequence_id: SequenceId,
    visited: AHashSet<PrimaryId>,
    on_path: AHashSet<PrimaryId>,
}

impl<'a> Rebuilder<'a> {
    fn new(primaries: &'a [PrimaryNode], edges: &'a [EdgeNode]) -> Self {
        let mut outgoing: AHashMap<PrimaryId, Vec<&'a EdgeNode>> = AHashMap::new();
        for edge in edges {
            outgoing.entry(edge.owner_primary_id).or_default().push(edge);
        }
        Self {
            primaries: primaries.iter().map(|p| (p.id, p)).collect(),
            outgoing,
            sequence_id: SequenceId(0),
            visited: AHashSet::new(),
            on_path: AHashSet::new(),
        }
    }

    fn rebuild(&mut self, primary: &'a PrimaryNode) -> Result<Node, CorruptionError> {
        let owner = primary.id;
        self.on_path.insert(owner);

        let edges = self.outgoing.get(&owner).cloned().unwrap_or_default();
        let mut args = BTreeMap::new();
        let mut body_edges = Vec::new();

        for edge in edges {
            match &edge.slot {
                EdgeSlot::Body(position) => body_edges.push((*position, edge)),
                EdgeSlot::Arg(name) => {
                    if args.contains_key(name) {
                        return Err(CorruptionError::DuplicateArg {
                            owner,
                            slot: name.clone(),
                        });
                    }
                    let value = match &edge.target {
                        EdgeTarget::Literal(scalar) => Value::Scalar(scalar.clone()),
                        EdgeTarget::Node(target) => Value::Node(self.follow(edge, *target)?),
                    };
                    args.insert(name.clone(), value);
                }
            }
        }

        body_edges.sort_by_key(|(position, _)| *position);
        if let Some(((position, _), _)) = body_edges
            .iter()
            .tuple_windows()
            .find(|((a, _), (b, _))| a == b)
        {
            return Err(CorruptionError::DuplicatePosition {
                owner,
                position: *position,
            });
        }

        let mut body = Vec::with_capacity(body_edges.len());
        for (position, edge) in body_edges {
            match &edge.target {
                EdgeTarget::Node(target) => body.push(self.follow(edge, *target)?),
                EdgeTarget::Literal(_) => {
                    return Err(CorruptionError::LiteralInBody { owner, position });
                }
            }
        }

        self.on_path.remove(&owner);
        Node::new(primary.kind, args, body).map_err(|source| CorruptionError::InvalidShape {
            primary: owner,
            source,
        })
    }

    /// Resolves and rebuilds the record an edge points at.
    fn follow(&mut self, edge: &EdgeNode, target: PrimaryId) -> Result<Arc<Node>, CorruptionError> {
        let owner = edge.owner_primary_id;
        let slot = edge.slot.to_string();

        if self.on_path.contains(&target) {
            return Err(CorruptionError::Cycle { owner, slot, target });
        }
        if !self.visited.insert(target) {
            return Err(CorruptionError::SharedTarget { owner, slot, target });
        }
        let primary = self
            .primaries
            .get(&target)
            .copied()
            .ok_or(CorruptionError::MissingTarget { owner, slot, target })?;
        if primary.owner_sequence_id != self.sequence_id {
            return Err(CorruptionError::ForeignRecord {
                primary: target,
                expected: self.sequence_id,
                found: primary.owner_sequence_id,
            });
        }
        self.rebuild(primary).map(Arc::new)
    }
}
