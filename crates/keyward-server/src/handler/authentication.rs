//! Authentication handlers: registration, login, and token refresh.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use keyward_store::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::{RefreshToken, ValidateJson};
use crate::handler::Result;
use crate::service::{AuthService, ServiceState};

/// Tracing target for authentication handlers.
const TRACING_TARGET: &str = "keyward_server::handler::authentication";

/// Token type label returned with every issued token.
const TOKEN_TYPE_BEARER: &str = "bearer";

/// Request payload for registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
struct RegisterRequest {
    /// Principal identifier (email address or username per deployment).
    #[validate(length(min = 3, max = 254))]
    pub id: String,
    /// Password of the account.
    #[validate(length(min = 1, max = 512))]
    pub password: String,
    /// Role assigned to the new principal.
    pub role: Role,
}

/// Response returned after successful registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct RegisterResponse {
    /// Normalized identifier the principal was registered under.
    pub id: String,
    /// Role assigned to the principal.
    pub role: Role,
}

/// Creates a new principal.
#[tracing::instrument(skip_all)]
async fn register(
    State(auth_service): State<AuthService>,
    ValidateJson(request): ValidateJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    tracing::trace!(
        target: TRACING_TARGET,
        id = %request.id,
        role = %request.role,
        "registration attempt"
    );

    let principal = auth_service
        .register(&request.id, &request.password, request.role)
        .await?;

    Ok(Json(RegisterResponse {
        id: principal.id,
        role: principal.role,
    }))
}

/// Request payload for login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
struct LoginRequest {
    /// Principal identifier.
    #[validate(length(min = 1, max = 254))]
    pub id: String,
    /// Password of the account.
    #[validate(length(min = 1, max = 512))]
    pub password: String,
}

/// Response returned after successful login.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct LoginResponse {
    /// Short-lived token for protected endpoints.
    pub access_token: String,
    /// Long-lived token for the refresh endpoint.
    pub refresh_token: String,
    /// Token type label.
    pub token_type: String,
}

/// Verifies credentials and issues an access/refresh token pair.
#[tracing::instrument(skip_all)]
async fn login(
    State(auth_service): State<AuthService>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    tracing::trace!(
        target: TRACING_TARGET,
        id = %request.id,
        "login attempt"
    );

    let tokens = auth_service.login(&request.id, &request.password).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: TOKEN_TYPE_BEARER.to_owned(),
    }))
}

/// Response returned after a successful token refresh.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct RefreshResponse {
    /// Fresh short-lived access token.
    pub access_token: String,
    /// Token type label.
    pub token_type: String,
}

/// Exchanges a refresh token for a new access token.
#[tracing::instrument(skip_all)]
async fn refresh(
    State(auth_service): State<AuthService>,
    RefreshToken(refresh_token): RefreshToken,
) -> Result<Json<RefreshResponse>> {
    let access_token = auth_service.refresh(&refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: TOKEN_TYPE_BEARER.to_owned(),
    }))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}
