//! # seqgraph - Command Sequence Trees, Graphs and Editing
//!
//! **seqgraph** manages tree-shaped robot command programs ("sequences"). A
//! sequence is a tree of command nodes whose arguments may themselves be nodes
//! and whose bodies hold ordered child steps.
//!
//! ## Core Workflow
//!
//! 1.  **Build a tree**: construct [`ast::Node`]s with `Node::builder`, or read
//!     sequence JSON with [`convert::NodeReader`]. Every node is checked against
//!     the shape table of its [`ast::NodeKind`] when it is built.
//! 2.  **Flatten**: [`flat_ir::flatten`] turns the tree into pre-order Flat-IR,
//!     one entry per node tagged with its owner and slot.
//! 3.  **Materialize**: [`graph::SecondPass`] turns Flat-IR into one
//!     [`graph::PrimaryNode`] per node plus typed, ordered [`graph::EdgeNode`]s.
//! 4.  **Reconstruct**: [`graph::reconstruct`] rebuilds an equal tree from the
//!     records.
//! 5.  **Edit**: [`editor::splice`] and [`editor::move_step`] return new
//!     sequence snapshots with a step inserted or relocated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seqgraph::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let wait = Node::builder(NodeKind::Wait).arg("milliseconds", 500).build()?;
//!     let root = Node::builder(NodeKind::Sequence).step(wait).build()?;
//!
//!     // Tree -> Flat-IR -> records
//!     let entries = flatten(&root);
//!     let mut pass = SecondPass::new(SequenceId(1), SequentialIds::new());
//!     let primaries = pass.run(entries)?;
//!     assert_eq!(primaries.len(), 2);
//!
//!     // Records -> tree
//!     let rebuilt = reconstruct(primaries[0].id, &primaries, pass.edges())?;
//!     assert_eq!(rebuilt, root);
//!
//!     // Editing
//!     let sequence = Sequence::new(SequenceId(1), "Water plants", root)?;
//!     let photo = std::sync::Arc::new(Node::builder(NodeKind::TakePhoto).build()?);
//!     let edited = splice(photo, &sequence, APPEND)?;
//!     println!("{}", DisplayNode { node: edited.root() });
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod convert;
pub mod editor;
pub mod error;
pub mod flat_ir;
pub mod graph;
pub mod prelude;
pub mod store;
