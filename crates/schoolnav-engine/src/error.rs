//! Collaborator failures.

use schoolnav_logic::NavError;
use thiserror::Error;

/// Why a grid provider or point repository could not deliver.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    /// The backend answered with a non-success status.
    #[error("backend reported {status}: {message}")]
    Backend { status: String, message: String },

    #[error("no grid for floor {0}")]
    MissingFloor(i32),

    #[error("cache version mismatch: expected {expected}, found {found}")]
    CacheVersion { expected: u32, found: u32 },

    /// Data decoded but failed model validation.
    #[error(transparent)]
    Invalid(#[from] NavError),
}

impl ProviderError {
    /// Collapse a grid failure into the navigation error taxonomy.
    pub fn into_grid_error(self, floor: i32) -> NavError {
        match self {
            ProviderError::Invalid(err @ NavError::MalformedGrid(_)) => err,
            other => NavError::GridUnavailable {
                floor,
                reason: other.to_string(),
            },
        }
    }
}
