use super::{NodeKind, Value};
use crate::error::NodeError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One command or operator in a sequence tree.
///
/// A `Node` is immutable and always well-formed: every constructor checks the
/// arguments and body against [`NodeKind::shape`], so an illegal slot/kind
/// combination is reported when the node is built, never while it is being
/// flattened or persisted. Children are shared through `Arc`, which lets the
/// editor relocate a step without copying it. Nodes never point at their
/// parent; ownership is expressed by containment only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    kind: NodeKind,
    args: BTreeMap<String, Value>,
    body: Vec<Arc<Node>>,
}

impl Node {
    pub fn new(
        kind: NodeKind,
        args: BTreeMap<String, Value>,
        body: Vec<Arc<Node>>,
    ) -> Result<Self, NodeError> {
        kind.shape().check(kind, &args, &body)?;
        Ok(Self { kind, args, body })
    }

    pub fn builder(kind: NodeKind) -> NodeBuilder {
        NodeBuilder::new(kind)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Arguments in lexical slot-name order.
    pub fn args(&self) -> &BTreeMap<String, Value> {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    pub fn body(&self) -> &[Arc<Node>] {
        &self.body
    }

    /// Returns a copy of this node with its body replaced, re-checking the shape.
    pub fn with_body(&self, body: Vec<Arc<Node>>) -> Result<Self, NodeError> {
        Self::new(self.kind, self.args.clone(), body)
    }

    /// Total number of nodes in this tree, including nested argument nodes.
    pub fn node_count(&self) -> usize {
        1 + self.body.iter().map(|n| n.node_count()).sum::<usize>()
            + self
                .args
                .values()
                .filter_map(Value::as_node)
                .map(|n| n.node_count())
                .sum::<usize>()
    }
}

/// Incrementally assembles a [`Node`], validating it on `build`.
pub struct NodeBuilder {
    kind: NodeKind,
    args: BTreeMap<String, Value>,
    body: Vec<Arc<Node>>,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            args: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn step(mut self, child: impl Into<Arc<Node>>) -> Self {
        self.body.push(child.into());
        self
    }

    pub fn steps<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Node>>,
    {
        self.body.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<Node, NodeError> {
        Node::new(self.kind, self.args, self.body)
    }
}
