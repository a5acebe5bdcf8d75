//! Durable-store contracts.
//!
//! These traits are the entire surface the service core needs from
//! persistence. The correctness of concurrent registration hinges on
//! [`IdentityStore::insert`] being atomic insert-if-absent, so backends must
//! enforce that at the storage level (unique constraint, compare-and-set, or
//! an equivalent) rather than with a read-then-write sequence.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{Principal, VaultEntry};

/// Durable mapping from principal identifier to credential and role.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Finds a principal by its unique identifier.
    async fn find(&self, id: &str) -> StoreResult<Option<Principal>>;

    /// Inserts a new principal, failing if the identifier is taken.
    ///
    /// Atomic with respect to concurrent inserts for the same identifier:
    /// of two racing calls, exactly one succeeds and the other observes
    /// [`StoreError::Conflict`].
    ///
    /// [`StoreError::Conflict`]: crate::StoreError::Conflict
    async fn insert(&self, principal: Principal) -> StoreResult<()>;
}

/// Durable mapping from principal identifier to encrypted API credentials.
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Finds the vault entry owned by `owner`, if any.
    async fn find(&self, owner: &str) -> StoreResult<Option<VaultEntry>>;

    /// Stores or replaces the entry for `entry.owner`.
    ///
    /// Idempotent overwrite; at most one entry per owner survives.
    async fn upsert(&self, entry: VaultEntry) -> StoreResult<()>;
}
