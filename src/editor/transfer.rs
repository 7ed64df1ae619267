use super::{Origin, Sequence, move_step, splice};
use crate::ast::Node;
use crate::error::EditError;
use ahash::AHashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque key identifying one drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferKey(Uuid);

impl fmt::Display for TransferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TransferKey)
    }
}

/// What dropping a dragged step should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIntent {
    /// Insert a new step, e.g. one dragged from the command palette.
    Splice,
    /// Relocate the step currently at `from` in the same body.
    Move { from: usize },
}

#[derive(Debug, Clone)]
pub struct DataTransfer {
    pub step: Arc<Node>,
    pub intent: DropIntent,
}

/// Holds in-flight drag payloads until they are dropped.
#[derive(Debug, Default)]
pub struct TransferRegistry {
    transfers: AHashMap<TransferKey, DataTransfer>,
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload at drag start and returns its key.
    pub fn put(&mut self, transfer: DataTransfer) -> TransferKey {
        let key = TransferKey(Uuid::new_v4());
        self.transfers.insert(key, transfer);
        key
    }

    pub fn get(&self, key: &TransferKey) -> Option<&DataTransfer> {
        self.transfers.get(key)
    }

    /// Removes a payload once its drag session has ended.
    pub fn take(&mut self, key: &TransferKey) -> Option<DataTransfer> {
        self.transfers.remove(key)
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// Applies a drop at `index` using the payload registered under `key`.
///
/// An empty key means nothing was dragged and yields `Ok(None)`. A key that
/// does not parse or is not registered is an error.
pub fn on_drop(
    registry: &TransferRegistry,
    sequence: &Sequence,
    index: usize,
    key: &str,
) -> Result<Option<Sequence>, EditError> {
    if key.is_empty() {
        return Ok(None);
    }
    let transfer = key
        .parse::<TransferKey>()
        .ok()
        .and_then(|k| registry.get(&k))
        .ok_or_else(|| EditError::UnknownTransfer(key.to_string()))?;

    let edited = match transfer.intent {
        DropIntent::Splice => splice(Arc::clone(&transfer.step), sequence, index)?,
        DropIntent::Move { from } => {
            move_step(&transfer.step, sequence, index, Origin::Body(from))?
        }
    };
    Ok(Some(edited))
}
