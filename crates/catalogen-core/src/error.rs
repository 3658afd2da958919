use thiserror::Error;

use crate::metadata::IdKind;

/// Errors raised by metadata store implementations.
#[derive(Debug, Error)]
pub enum Error {
    /// The entity type code is not registered in the store.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
    /// No attribute with this code exists for the entity type.
    #[error("unknown attribute '{code}' for entity type {entity_type_id}")]
    UnknownAttribute { entity_type_id: u64, code: String },
    /// The entity type has no default attribute set to clone.
    #[error("no default attribute set for entity type {0}")]
    MissingDefaultSet(u64),
    /// A category referenced by id does not exist.
    #[error("category {0} not found")]
    CategoryNotFound(u64),
    /// The store cannot report a maximum for this identifier kind.
    #[error("unsupported identifier kind: {0:?}")]
    UnsupportedKind(IdKind),
    /// The snapshot document is inconsistent.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by metadata stores.
pub type Result<T> = std::result::Result<T, Error>;
