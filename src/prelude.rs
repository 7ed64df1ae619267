//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! seqgraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use seqgraph::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/sequence.json")?;
//! let root = NodeReader::default().read_str(&json)?;
//!
//! let store = MemoryStore::new();
//! let sequence = Sequence::new(SequenceId(7), "Imported", root)?;
//! store.save_sequence(&sequence)?;
//! let rebuilt = store.load_sequence(SequenceId(7))?;
//! println!("{}", DisplayNode { node: &rebuilt });
//! # Ok(())
//! # }
//! ```

// Node model
pub use crate::ast::{DisplayNode, Node, NodeBuilder, NodeKind, Scalar, Value};

// Passes
pub use crate::flat_ir::{FlatArg, FlatEntry, Owner, Slot, TempId, flatten};
pub use crate::graph::{
    EdgeId, EdgeNode, EdgeSlot, EdgeTarget, EdgeType, IdSource, PrimaryId, PrimaryNode,
    SecondPass, SequenceId, SequentialIds, reconstruct,
};

// Editing
pub use crate::editor::{
    APPEND, DataTransfer, DropIntent, Origin, Sequence, TransferKey, TransferRegistry, move_step,
    on_drop, splice,
};

// Conversion and storage
pub use crate::convert::NodeReader;
pub use crate::store::{MemoryStore, StoredGraph};

// Error types
pub use crate::error::{CorruptionError, EditError, MaterializeError, NodeError, StoreError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
