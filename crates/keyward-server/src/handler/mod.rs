//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod api_keys;
mod authentication;
mod error;
mod monitors;
mod profile;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(authentication::routes())
        .merge(profile::routes())
        .merge(api_keys::routes())
        .merge(monitors::routes())
        .fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use axum_test::TestServer;
    use jiff::SignedDuration;
    use keyward_core::crypto::EncryptionKey;
    use keyward_store::{IdentityStore, MemoryStore, SecretVault};

    use crate::service::{
        AuthService, IdentityKind, MasterKey, PasswordHasher, ServiceState, TokenCodec,
    };

    /// Returns application state wired entirely in memory.
    pub fn create_test_state() -> anyhow::Result<ServiceState> {
        let store = MemoryStore::new();
        let identity: Arc<dyn IdentityStore> = Arc::new(store.clone());
        let vault: Arc<dyn SecretVault> = Arc::new(store);

        let codec = TokenCodec::new(
            b"handler-test-signing-secret-0123456789abcdef",
            SignedDuration::from_secs(3600),
            SignedDuration::from_secs(86400 * 7),
        )?;

        let auth_service = AuthService::new(
            identity,
            vault,
            PasswordHasher::new()?,
            codec,
            MasterKey::new(EncryptionKey::generate()),
            IdentityKind::EmailAddress,
        );

        Ok(ServiceState::new(auth_service))
    }

    /// Returns a new [`TestServer`] with all routes and in-memory state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        let state = create_test_state()?;
        let app = super::routes().with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let response = server.get("/definitely-not-a-route").await;
        response.assert_status_not_found();
        Ok(())
    }

    #[tokio::test]
    async fn end_to_end_credential_and_vault_flow() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        // Register a client principal.
        let response = server
            .post("/register")
            .json(&serde_json::json!({
                "id": "a@x.com",
                "password": "secret1",
                "role": "client"
            }))
            .await;
        response.assert_status_ok();

        // Login yields both token classes.
        let response = server
            .post("/login")
            .json(&serde_json::json!({
                "id": "a@x.com",
                "password": "secret1"
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let access_token = body["access_token"].as_str().unwrap().to_owned();
        let refresh_token = body["refresh_token"].as_str().unwrap().to_owned();

        // The access token authorizes the profile endpoint.
        let response = server
            .get("/profile")
            .authorization_bearer(access_token.as_str())
            .await;
        response.assert_status_ok();
        let profile: serde_json::Value = response.json();
        assert_eq!(profile["id"], "a@x.com");
        assert_eq!(profile["role"], "client");

        // Store and read back third-party credentials.
        let response = server
            .post("/keys")
            .authorization_bearer(access_token.as_str())
            .json(&serde_json::json!({ "api_key": "K", "api_secret": "S" }))
            .await;
        response.assert_status_ok();

        let response = server.get("/keys").authorization_bearer(access_token.as_str()).await;
        response.assert_status_ok();
        let keys: serde_json::Value = response.json();
        assert_eq!(keys["api_key"], "K");
        assert_eq!(keys["api_secret"], "S");

        // A different subject sees no entry.
        server
            .post("/register")
            .json(&serde_json::json!({
                "id": "b@x.com",
                "password": "secret2",
                "role": "client"
            }))
            .await
            .assert_status_ok();
        let response = server
            .post("/login")
            .json(&serde_json::json!({ "id": "b@x.com", "password": "secret2" }))
            .await;
        let other: serde_json::Value = response.json();
        let other_access = other["access_token"].as_str().unwrap();

        let response = server.get("/keys").authorization_bearer(other_access).await;
        response.assert_status_not_found();

        // The refresh token mints a new access token for the same subject.
        let response = server
            .post("/refresh")
            .add_header("x-refresh-token", refresh_token.as_str())
            .await;
        response.assert_status_ok();
        let refreshed: serde_json::Value = response.json();
        let new_access = refreshed["access_token"].as_str().unwrap();

        let response = server.get("/profile").authorization_bearer(new_access).await;
        response.assert_status_ok();
        let profile: serde_json::Value = response.json();
        assert_eq!(profile["id"], "a@x.com");
        assert_eq!(profile["role"], "client");

        Ok(())
    }
}
