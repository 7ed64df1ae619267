use crate::ast::{Accepts, NodeKind};
use crate::flat_ir::TempId;
use crate::graph::{PrimaryId, SequenceId};
use thiserror::Error;

/// Errors raised while constructing or loading a node tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Unknown node kind '{0}'")]
    UnknownKind(String),

    #[error("Node of kind '{kind}' has no argument slot named '{slot}'")]
    UnknownArg { kind: NodeKind, slot: String },

    #[error("Node of kind '{kind}' is missing required argument '{slot}'")]
    MissingArg { kind: NodeKind, slot: String },

    #[error("Argument '{slot}' of '{kind}' must hold {expected}")]
    IllegalValue {
        kind: NodeKind,
        slot: String,
        expected: Accepts,
    },

    #[error("Argument '{slot}' of '{kind}' holds a non-finite number")]
    NonFiniteNumber { kind: NodeKind, slot: String },

    #[error("Node of kind '{kind}' may not have a body")]
    BodyForbidden { kind: NodeKind },

    #[error("Node of kind '{kind}' requires a non-empty body")]
    BodyRequired { kind: NodeKind },

    #[error("Malformed sequence JSON: {0}")]
    Json(String),
}

/// Internal-consistency failures while materializing Flat-IR into records.
///
/// Each of these means the Flat-IR did not come from a well-behaved flattening
/// run; none of them can be fixed by retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterializeError {
    #[error("Temporary id {0} appears more than once")]
    DuplicateTempId(TempId),

    #[error("Entry {temp_id} references owner {owner} which has not been created")]
    UnresolvedOwner { temp_id: TempId, owner: TempId },

    #[error("Entry {0} is a second root; only one entry may have no owner")]
    MultipleRoots(TempId),

    #[error("Argument '{slot}' of entry {owner} references {target} which does not exist")]
    DanglingArgRef {
        owner: TempId,
        slot: String,
        target: TempId,
    },

    #[error(
        "Argument '{slot}' of entry {owner} and the ownership of entry {target} disagree"
    )]
    MisroutedArg {
        owner: TempId,
        slot: String,
        target: TempId,
    },

    #[error("Record {owner} already has an edge in slot {slot}")]
    DuplicateSlot { owner: PrimaryId, slot: String },
}

/// Structural corruption detected while rebuilding a tree from records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorruptionError {
    #[error("Root record {0} is not part of the supplied record set")]
    MissingRoot(PrimaryId),

    #[error("Edge {slot} of record {owner} targets missing record {target}")]
    MissingTarget {
        owner: PrimaryId,
        slot: String,
        target: PrimaryId,
    },

    #[error("Record {owner} has more than one body edge at position {position}")]
    DuplicatePosition { owner: PrimaryId, position: usize },

    #[error("Record {owner} has more than one edge for argument '{slot}'")]
    DuplicateArg { owner: PrimaryId, slot: String },

    #[error("Body edge at position {position} of record {owner} holds a literal instead of a node")]
    LiteralInBody { owner: PrimaryId, position: usize },

    #[error("Cycle detected: edge {slot} of record {owner} leads back to record {target}")]
    Cycle {
        owner: PrimaryId,
        slot: String,
        target: PrimaryId,
    },

    #[error("Record {target} is targeted by more than one edge (again via {slot} of record {owner})")]
    SharedTarget {
        owner: PrimaryId,
        slot: String,
        target: PrimaryId,
    },

    #[error("Record {primary} belongs to sequence {found}, expected sequence {expected}")]
    ForeignRecord {
        primary: PrimaryId,
        expected: SequenceId,
        found: SequenceId,
    },

    #[error("Record {primary} does not form a valid node: {source}")]
    InvalidShape {
        primary: PrimaryId,
        #[source]
        source: NodeError,
    },
}

/// Caller misuse of the structural editor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Step index {index} is out of range for a body of {len} steps")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("The step at index {index} is not the step being moved")]
    StepMismatch { index: usize },

    #[error("A sequence must be rooted at a 'sequence' node, found '{0}'")]
    NotASequence(NodeKind),

    #[error("No drag transfer is registered under key '{0}'")]
    UnknownTransfer(String),

    #[error("Edit produced an invalid node: {0}")]
    Shape(#[from] NodeError),
}

/// Errors from the in-memory graph store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sequence {0} has no stored graph")]
    NotFound(SequenceId),

    #[error("Materialization failed: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("Stored graph is corrupt: {0}")]
    Corruption(#[from] CorruptionError),

    #[error("Materialization produced no root record for sequence {0}")]
    EmptyGraph(SequenceId),

    #[error("A store lock was poisoned by a panicking writer")]
    LockPoisoned,

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(String),
}
