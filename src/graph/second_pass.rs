use super::record::{EdgeNode, EdgeSlot, EdgeTarget, IdSource, PrimaryId, PrimaryNode, SequenceId};
use crate::error::MaterializeError;
use crate::flat_ir::{FlatArg, FlatEntry, Owner, Slot, TempId};
use ahash::{AHashMap, AHashSet};

/// Materializes Flat-IR into primary and edge records.
///
/// [`SecondPass::run`] returns one [`PrimaryNode`] per entry, in entry order.
/// The edges wiring them together are kept on the pass and read separately
/// through [`SecondPass::edges`] or [`SecondPass::into_edges`]; they always
/// describe the most recent run. A run that fails leaves no edges behind.
pub struct SecondPass<I: IdSource> {
    sequence_id: SequenceId,
    ids: I,
    resolved: AHashMap<TempId, PrimaryId>,
    edges: Vec<EdgeNode>,
    occupied: AHashSet<(PrimaryId, EdgeSlot)>,
}

impl<I: IdSource> SecondPass<I> {
    pub fn new(sequence_id: SequenceId, ids: I) -> Self {
        Self {
            sequence_id,
            ids,
            resolved: AHashMap::new(),
            edges: Vec::new(),
            occupied: AHashSet::new(),
        }
    }

    pub fn run(&mut self, entries: Vec<FlatEntry>) -> Result<Vec<PrimaryNode>, MaterializeError> {
        self.reset();
        let result = self.materialize(&entries);
        if let Err(e) = &result {
            tracing::debug!(sequence = %self.sequence_id, error = %e, "discarding partial graph");
            self.reset();
        }
        result
    }

    fn reset(&mut self) {
        self.resolved.clear();
        self.edges.clear();
        self.occupied.clear();
    }

    fn materialize(&mut self, entries: &[FlatEntry]) -> Result<Vec<PrimaryNode>, MaterializeError> {
        let mut nodes = Vec::with_capacity(entries.len());
        let mut root: Option<TempId> = None;

        for entry in entries {
            if self.resolved.contains_key(&entry.temp_id) {
                return Err(MaterializeError::DuplicateTempId(entry.temp_id));
            }
            let id = self.ids.next_primary_id();

            match &entry.owner {
                None => {
                    if root.is_some() {
                        return Err(MaterializeError::MultipleRoots(entry.temp_id));
                    }
                    root = Some(entry.temp_id);
                }
                Some(owner) => {
                    let owner_id = *self.resolved.get(&owner.temp_id).ok_or(
                        MaterializeError::UnresolvedOwner {
                            temp_id: entry.temp_id,
                            owner: owner.temp_id,
                        },
                    )?;
                    let slot = match &owner.slot {
                        Slot::Body(position) => EdgeSlot::Body(*position),
                        Slot::Arg(name) => EdgeSlot::Arg(name.clone()),
                    };
                    self.push_edge(owner_id, slot, EdgeTarget::Node(id))?;
                }
            }
            self.resolved.insert(entry.temp_id, id);

            for (name, arg) in &entry.args {
                if let FlatArg::Scalar(value) = arg {
                    self.push_edge(id, EdgeSlot::Arg(name.clone()), EdgeTarget::Literal(value.clone()))?;
                }
            }

            tracing::trace!(temp_id = %entry.temp_id, primary = %id, kind = %entry.kind, "created primary record");
            nodes.push(PrimaryNode {
                id,
                kind: entry.kind,
                owner_sequence_id: self.sequence_id,
            });
        }

        Self::check_arg_refs(entries)?;

        tracing::debug!(
            sequence = %self.sequence_id,
            nodes = nodes.len(),
            edges = self.edges.len(),
            "materialized sequence graph"
        );
        Ok(nodes)
    }

    /// Edges created by the most recent run.
    pub fn edges(&self) -> &[EdgeNode] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<EdgeNode> {
        self.edges
    }

    fn push_edge(
        &mut self,
        owner: PrimaryId,
        slot: EdgeSlot,
        target: EdgeTarget,
    ) -> Result<(), MaterializeError> {
        if !self.occupied.insert((owner, slot.clone())) {
            return Err(MaterializeError::DuplicateSlot {
                owner,
                slot: slot.to_string(),
            });
        }
        let id = self.ids.next_edge_id();
        self.edges.push(EdgeNode {
            id,
            owner_primary_id: owner,
            slot,
            target,
        });
        Ok(())
    }

    /// Every `FlatArg::Ref` must point at an entry owned through that same
    /// argument slot, and every entry owned through an argument slot must be
    /// referenced from it.
    fn check_arg_refs(entries: &[FlatEntry]) -> Result<(), MaterializeError> {
        let by_temp: AHashMap<TempId, &FlatEntry> =
            entries.iter().map(|e| (e.temp_id, e)).collect();

        for entry in entries {
            for (name, arg) in &entry.args {
                let FlatArg::Ref(target) = arg else { continue };
                let child = by_temp.get(target).ok_or_else(|| MaterializeError::DanglingArgRef {
                    owner: entry.temp_id,
                    slot: name.clone(),
                    target: *target,
                })?;
                let expected = Owner {
                    temp_id: entry.temp_id,
                    slot: Slot::Arg(name.clone()),
                };
                if child.owner.as_ref() != Some(&expected) {
                    return Err(MaterializeError::MisroutedArg {
                        owner: entry.temp_id,
                        slot: name.clone(),
                        target: *target,
                    });
                }
            }

            if let Some(Owner {
                temp_id: owner,
                slot: Slot::Arg(name),
            }) = &entry.owner
            {
                let referenced = by_temp
                    .get(owner)
                    .and_then(|o| o.args.get(name))
                    .is_some_and(|arg| *arg == FlatArg::Ref(entry.temp_id));
                if !referenced {
                    return Err(MaterializeError::MisroutedArg {
                        owner: *owner,
                        slot: name.clone(),
                        target: entry.temp_id,
                    });
                }
            }
        }
        Ok(())
    }
}
