use super::{FlatArg, FlatEntry, Owner, Slot, TempId};
use crate::ast::{Node, Value};
use std::collections::BTreeMap;

/// Flattens a node tree into pre-order Flat-IR.
///
/// Each node becomes one entry, emitted before its children. Body children are
/// visited first in body order, then node-valued arguments in lexical slot
/// order. Node-valued arguments are replaced in the owner's `args` by a
/// [`FlatArg::Ref`] to the child's entry.
///
/// Nodes are validated when they are built, so a tree that reaches this pass is
/// well-formed and flattening cannot fail.
///
/// The walk is recursive, one stack frame per level of nesting. Trees nested
/// tens of thousands of levels deep can exhaust the thread's stack; run such
/// inputs on a thread with a larger stack.
pub fn flatten(root: &Node) -> Vec<FlatEntry> {
    let mut pass = FirstPass::default();
    pass.visit(root, None);
    tracing::debug!(
        root = %root.kind(),
        entries = pass.entries.len(),
        "flattened node tree"
    );
    pass.entries
}

#[derive(Default)]
struct FirstPass {
    entries: Vec<FlatEntry>,
    next_id: usize,
}

impl FirstPass {
    fn visit(&mut self, node: &Node, owner: Option<Owner>) -> TempId {
        let temp_id = TempId(self.next_id);
        self.next_id += 1;

        let mut args = BTreeMap::new();
        let mut nested = Vec::new();
        for (name, value) in node.args() {
            match value {
                Value::Scalar(s) => {
                    args.insert(name.clone(), FlatArg::Scalar(s.clone()));
                }
                Value::Node(child) => nested.push((name, child)),
            }
        }

        let index = self.entries.len();
        self.entries.push(FlatEntry {
            temp_id,
            kind: node.kind(),
            owner,
            args,
        });

        for (position, child) in node.body().iter().enumerate() {
            self.visit(
                child,
                Some(Owner {
                    temp_id,
                    slot: Slot::Body(position),
                }),
            );
        }

        for (name, child) in nested {
            let child_id = self.visit(
                child,
                Some(Owner {
                    temp_id,
                    slot: Slot::Arg(name.clone()),
                }),
            );
            self.entries[index]
                .args
                .insert(name.clone(), FlatArg::Ref(child_id));
        }

        temp_id
    }
}
