//! Storage error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the durable-store contracts.
///
/// Backends map their native failures onto these variants; the service layer
/// never sees driver-specific error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert collided with an existing record for the same identifier.
    #[error("record already exists for this identifier")]
    Conflict,
    /// No record exists for the requested identifier.
    #[error("no record exists for this identifier")]
    NotFound,
    /// The backend itself failed (connectivity, I/O, serialization).
    #[error("store backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
