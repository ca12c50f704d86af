use thiserror::Error;
use tracing::warn;

use crate::types::PlantId;

/// A broken contract on a single grid or genome operation.
///
/// Violations are local to the operation that produced them; the tick
/// they happen in still runs to completion.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("slot ({x}, {y}) is already occupied")]
    SlotOccupied { x: i32, y: i32 },
    #[error("slot ({x}, {y}) is already empty")]
    SlotEmpty { x: i32, y: i32 },
    #[error("slot ({x}, {y}) lies outside the grid")]
    OutsideGrid { x: i32, y: i32 },
    #[error("plant {0} is not registered in the garden")]
    UnknownPlant(PlantId),
    #[error("chromosome length {actual} does not match direction count {expected}")]
    ChromosomeLength { expected: usize, actual: usize },
    #[error("genome must contain at least one chromosome")]
    EmptyGenome,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] Violation),
    /// Raised when an active chromosome index does not address a chromosome.
    #[error("chromosome index {index} out of range for genome of {len} chromosomes")]
    OutOfRange { index: usize, len: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Logs a failed grid or plant operation and lets the current pass continue.
pub(crate) fn tolerate<T>(result: Result<T, SimError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, "operation skipped");
            None
        }
    }
}
