//! Encrypted third-party API credential handlers.
//!
//! The vault operations take the raw bearer token and authorize inside the
//! auth service, because the storage key must be the verified token subject.
//! A client-supplied owner field does not exist anywhere on this surface.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::{BearerToken, ValidateJson};
use crate::handler::Result;
use crate::service::{AuthService, ServiceState};

/// Request payload for storing API credentials.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
struct StoreKeysRequest {
    /// Third-party API key.
    #[validate(length(min = 1, max = 1024))]
    pub api_key: String,
    /// Third-party API secret.
    #[validate(length(min = 1, max = 1024))]
    pub api_secret: String,
}

/// Response returned after credentials are stored.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct StoreKeysResponse {
    /// Identifier the credentials were stored under.
    pub owner: String,
}

/// Encrypts and stores the caller's API credentials.
#[tracing::instrument(skip_all)]
async fn store_keys(
    State(auth_service): State<AuthService>,
    BearerToken(access_token): BearerToken,
    ValidateJson(request): ValidateJson<StoreKeysRequest>,
) -> Result<Json<StoreKeysResponse>> {
    let owner = auth_service
        .store_secret(&access_token, &request.api_key, &request.api_secret)
        .await?;

    Ok(Json(StoreKeysResponse { owner }))
}

/// Response carrying the decrypted credentials.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct ReadKeysResponse {
    /// Decrypted third-party API key.
    pub api_key: String,
    /// Decrypted third-party API secret.
    pub api_secret: String,
}

/// Retrieves and decrypts the caller's API credentials.
#[tracing::instrument(skip_all)]
async fn read_keys(
    State(auth_service): State<AuthService>,
    BearerToken(access_token): BearerToken,
) -> Result<Json<ReadKeysResponse>> {
    let credentials = auth_service.read_secret(&access_token).await?;

    Ok(Json(ReadKeysResponse {
        api_key: credentials.api_key,
        api_secret: credentials.api_secret,
    }))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/keys", post(store_keys).get(read_keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server;

    async fn access_token_for(
        server: &axum_test::TestServer,
        id: &str,
    ) -> anyhow::Result<String> {
        server
            .post("/register")
            .json(&serde_json::json!({
                "id": id,
                "password": "secret1",
                "role": "client"
            }))
            .await
            .assert_status_ok();

        let login: serde_json::Value = server
            .post("/login")
            .json(&serde_json::json!({ "id": id, "password": "secret1" }))
            .await
            .json();

        Ok(login["access_token"].as_str().unwrap().to_owned())
    }

    #[tokio::test]
    async fn store_then_read_roundtrip() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let token = access_token_for(&server, "k@example.com").await?;

        let response = server
            .post("/keys")
            .authorization_bearer(token.as_str())
            .json(&StoreKeysRequest {
                api_key: "exchange-key".to_owned(),
                api_secret: "exchange-secret".to_owned(),
            })
            .await;
        response.assert_status_ok();

        let stored: StoreKeysResponse = response.json();
        assert_eq!(stored.owner, "k@example.com");

        let response = server.get("/keys").authorization_bearer(token.as_str()).await;
        response.assert_status_ok();

        let body: ReadKeysResponse = response.json();
        assert_eq!(body.api_key, "exchange-key");
        assert_eq!(body.api_secret, "exchange-secret");

        Ok(())
    }

    #[tokio::test]
    async fn storing_again_overwrites() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let token = access_token_for(&server, "o@example.com").await?;

        for (key, secret) in [("first-key", "first-secret"), ("second-key", "second-secret")] {
            server
                .post("/keys")
                .authorization_bearer(token.as_str())
                .json(&serde_json::json!({ "api_key": key, "api_secret": secret }))
                .await
                .assert_status_ok();
        }

        let body: ReadKeysResponse = server
            .get("/keys")
            .authorization_bearer(token.as_str())
            .await
            .json();
        assert_eq!(body.api_key, "second-key");
        assert_eq!(body.api_secret, "second-secret");

        Ok(())
    }

    #[tokio::test]
    async fn read_without_entry_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let token = access_token_for(&server, "empty@example.com").await?;

        let response = server.get("/keys").authorization_bearer(token.as_str()).await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn keys_require_authentication() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        server.get("/keys").await.assert_status_unauthorized();

        server
            .post("/keys")
            .json(&serde_json::json!({ "api_key": "K", "api_secret": "S" }))
            .await
            .assert_status_unauthorized();

        Ok(())
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let token = access_token_for(&server, "v@example.com").await?;

        let response = server
            .post("/keys")
            .authorization_bearer(token.as_str())
            .json(&serde_json::json!({ "api_key": "", "api_secret": "S" }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }
}
