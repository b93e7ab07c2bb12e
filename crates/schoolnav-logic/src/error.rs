//! Navigation error taxonomy.

use thiserror::Error;

/// Why a navigation request produced no route.
///
/// Callers that only need a yes/no answer collapse every variant into
/// "no route"; the variants exist so logs and tests can tell them apart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    /// Grid has zero rows/columns or ragged rows.
    #[error("malformed grid: {0}")]
    MalformedGrid(String),

    /// Point inventory could not be built (duplicate ids and similar).
    #[error("invalid point inventory: {0}")]
    InvalidInventory(String),

    /// Engine configuration out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// Floor index outside the configured building range.
    #[error("floor {floor} outside building range {min}..={max}")]
    FloorOutOfRange { floor: i32, min: i32, max: i32 },

    /// No walkable cell or no connected channel on a floor.
    #[error("no route on floor {floor}: {reason}")]
    NoRoute { floor: i32, reason: String },

    /// Connector graph has no chain between the two floors.
    #[error("no connector chain from floor {from} to floor {to}")]
    NoConnectorChain { from: i32, to: i32 },

    /// A collaborator failed to supply a floor grid.
    #[error("grid for floor {floor} unavailable: {reason}")]
    GridUnavailable { floor: i32, reason: String },

    /// A point path broke an internal invariant; never emit directions for it.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type NavResult<T> = Result<T, NavError>;
