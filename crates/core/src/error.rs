//! Error types for tally.

use thiserror::Error;

/// Result type alias for tally operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for storage access and derived counter maintenance.
#[derive(Debug, Error)]
pub enum Error {
    /// Relation path does not exist on a table.
    #[error("Unknown relation {path} on table {table}")]
    UnknownRelation { table: String, path: String },
    /// Failure reported by the backing store.
    #[error("Storage failure: {message}")]
    Storage { message: String },
}

impl Error {
    /// Creates an unknown relation error.
    pub fn unknown_relation(table: impl Into<String>, path: impl Into<String>) -> Self {
        Error::UnknownRelation {
            table: table.into(),
            path: path.into(),
        }
    }

    /// Creates a storage failure error.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Returns true if this error came from the backing store.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage { .. })
    }
}
