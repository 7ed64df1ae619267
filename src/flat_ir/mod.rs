//! Flat-IR: the ordered, parent-referencing encoding of a node tree.
//!
//! Flat-IR is produced by [`flatten`] immediately before materialization and
//! discarded afterwards. Entries are in pre-order, so every owner precedes the
//! entries it owns.

use crate::ast::{NodeKind, Scalar};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod first_pass;

pub use first_pass::flatten;

/// Sequence-local id assigned during flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub usize);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The place an entry occupies inside its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Body(usize),
    Arg(String),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Body(i) => write!(f, "body[{}]", i),
            Slot::Arg(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub temp_id: TempId,
    pub slot: Slot,
}

/// An argument as carried by a flat entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlatArg {
    Scalar(Scalar),
    /// A node-valued argument, flattened into its own entry.
    Ref(TempId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub temp_id: TempId,
    pub kind: NodeKind,
    /// `None` only for the root entry.
    pub owner: Option<Owner>,
    pub args: BTreeMap<String, FlatArg>,
}

impl fmt::Display for FlatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.temp_id, self.kind)?;
        if let Some(owner) = &self.owner {
            write!(f, " <- {}.{}", owner.temp_id, owner.slot)?;
        }
        if !self.args.is_empty() {
            let args: Vec<String> = self
                .args
                .iter()
                .map(|(name, arg)| match arg {
                    FlatArg::Scalar(s) => format!("{}: {}", name, s),
                    FlatArg::Ref(t) => format!("{}: &{}", name, t),
                })
                .collect();
            write!(f, " {{{}}}", args.join(", "))?;
        }
        Ok(())
    }
}
