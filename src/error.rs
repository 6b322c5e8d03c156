//! Error taxonomy shared by the store and command layers.

use thiserror::Error;

/// Everything a mutation or store operation can fail with.
///
/// Derivation functions never produce these; they degrade by omission
/// instead. A failed mutation leaves the in-memory store untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was missing or malformed. The mutation was not
    /// attempted.
    #[error("{0}")]
    Validation(String),

    /// The targeted task no longer exists (e.g. deleted meanwhile).
    #[error("task {0} not found")]
    TaskNotFound(u64),

    /// The targeted or referenced project does not exist.
    #[error("project {0} not found")]
    ProjectNotFound(u64),

    /// The store file could not be read or written.
    #[error("store unavailable: {0}")]
    Store(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
