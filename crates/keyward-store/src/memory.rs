//! In-process store implementation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::model::{Principal, VaultEntry};
use crate::store::{IdentityStore, SecretVault};

/// Tracing target for store operations.
const TRACING_TARGET: &str = "keyward_store::memory";

/// In-memory implementation of both store contracts.
///
/// Backs the default wiring and the test suite. Atomicity comes from taking
/// the write lock across the whole check-and-insert: the entry API makes the
/// conflict decision and the write in one step, which is the behavior a
/// durable backend must reproduce with its own primitives.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    principals: Arc<RwLock<HashMap<String, Principal>>>,
    vault: Arc<RwLock<HashMap<String, VaultEntry>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find(&self, id: &str) -> StoreResult<Option<Principal>> {
        let principals = self.principals.read().await;
        Ok(principals.get(id).cloned())
    }

    async fn insert(&self, principal: Principal) -> StoreResult<()> {
        let mut principals = self.principals.write().await;
        match principals.entry(principal.id.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    id = %principal.id,
                    "insert rejected: principal already exists"
                );
                Err(StoreError::Conflict)
            }
            Entry::Vacant(slot) => {
                slot.insert(principal);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl SecretVault for MemoryStore {
    async fn find(&self, owner: &str) -> StoreResult<Option<VaultEntry>> {
        let vault = self.vault.read().await;
        Ok(vault.get(owner).cloned())
    }

    async fn upsert(&self, entry: VaultEntry) -> StoreResult<()> {
        let mut vault = self.vault.write().await;
        vault.insert(entry.owner.clone(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Role;

    use super::*;

    fn principal(id: &str) -> Principal {
        Principal {
            id: id.to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: Role::Client,
        }
    }

    fn entry(owner: &str, key: &[u8]) -> VaultEntry {
        VaultEntry {
            owner: owner.to_owned(),
            encrypted_api_key: key.to_vec(),
            encrypted_api_secret: b"sealed-secret".to_vec(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryStore::new();

        store.insert(principal("a@x.com")).await.unwrap();

        let found = IdentityStore::find(&store, "a@x.com").await.unwrap();
        assert_eq!(found.unwrap().id, "a@x.com");

        let missing = IdentityStore::find(&store, "b@x.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = MemoryStore::new();

        store.insert(principal("a@x.com")).await.unwrap();
        let second = store.insert(principal("a@x.com")).await;

        assert!(matches!(second, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = MemoryStore::new();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.spawn(async move { store.insert(principal("race@x.com")).await });
        }

        let results = tasks.join_all().await;
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::Conflict)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn upsert_overwrites_previous_entry() {
        let store = MemoryStore::new();

        store.upsert(entry("a@x.com", b"first")).await.unwrap();
        store.upsert(entry("a@x.com", b"second")).await.unwrap();

        let found = SecretVault::find(&store, "a@x.com").await.unwrap().unwrap();
        assert_eq!(found.encrypted_api_key, b"second");
    }

    #[tokio::test]
    async fn vault_entries_are_per_owner() {
        let store = MemoryStore::new();

        store.upsert(entry("a@x.com", b"alpha")).await.unwrap();

        let other = SecretVault::find(&store, "b@x.com").await.unwrap();
        assert!(other.is_none());
    }
}
