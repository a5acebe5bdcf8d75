//! Application state and dependency injection.

pub mod auth;
mod config;
pub mod security;

use std::sync::Arc;

use keyward_store::{IdentityStore, MemoryStore, SecretVault};

pub use crate::service::auth::{
    ApiCredentials, AuthClaims, AuthError, AuthService, TokenClass, TokenCodec, TokenError,
    TokenPair,
};
pub use crate::service::config::{IdentityKind, ServiceConfig, ServiceConfigBuilder};
pub use crate::service::security::{MasterKey, MasterKeyConfig, PasswordHasher};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    auth_service: AuthService,
}

impl ServiceState {
    /// Creates application state around an already wired [`AuthService`].
    ///
    /// Use this to plug in an external durable store implementation.
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }

    /// Initializes application state from configuration.
    ///
    /// Loads the vault encryption key and builds the security primitives.
    /// Storage defaults to the in-process [`MemoryStore`]; deployments with
    /// an external durable store construct the [`AuthService`] themselves
    /// and use [`ServiceState::new`].
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store = MemoryStore::new();
        let identity: Arc<dyn IdentityStore> = Arc::new(store.clone());
        let vault: Arc<dyn SecretVault> = Arc::new(store);

        let auth_service = AuthService::new(
            identity,
            vault,
            config.create_password_hasher()?,
            config.create_token_codec()?,
            config.load_master_key().await?,
            config.identity_kind,
        );

        Ok(Self::new(auth_service))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(auth_service: AuthService);
