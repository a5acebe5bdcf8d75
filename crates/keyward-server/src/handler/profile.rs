//! Claim-backed profile and role-gated handlers.

use axum::routing::get;
use axum::{Json, Router};
use jiff::Timestamp;
use keyward_store::Role;
use serde::{Deserialize, Serialize};

use crate::extract::{AccessClaims, AdminClaims};
use crate::handler::Result;
use crate::service::ServiceState;

/// Response describing the authenticated principal.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct ProfileResponse {
    /// Principal identifier from the verified token subject.
    pub id: String,
    /// Role embedded in the token.
    pub role: Role,
    /// When the presented token was issued.
    pub issued_at: Timestamp,
    /// When the presented token expires.
    pub expires_at: Timestamp,
}

/// Returns the verified claims of the presented access token.
#[tracing::instrument(skip_all)]
async fn profile(AccessClaims(claims): AccessClaims) -> Result<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse {
        id: claims.subject,
        role: claims.role,
        issued_at: claims.issued_at,
        expires_at: claims.expires_at,
    }))
}

/// Response for the admin-gated endpoint.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct AdminAreaResponse {
    /// Identifier of the administrator.
    pub id: String,
}

/// Accessible only with an access token carrying the admin role.
#[tracing::instrument(skip_all)]
async fn admin_only(AdminClaims(claims): AdminClaims) -> Result<Json<AdminAreaResponse>> {
    Ok(Json(AdminAreaResponse { id: claims.subject }))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/admin-only", get(admin_only))
}
