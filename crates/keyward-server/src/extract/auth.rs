//! Claim extractors: the HTTP edge of the authorization choke point.
//!
//! Handlers never parse an `Authorization` header or inspect a role claim
//! themselves. They declare one of these extractors, each of which routes
//! through [`AuthService::authorize`], so every protected route enforces the
//! same checks in the same order.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use keyward_store::Role;

use crate::handler::{Error, ErrorKind, Result};
use crate::service::{AuthClaims, AuthService};

/// Tracing target for authentication extraction.
const TRACING_TARGET: &str = "keyward_server::extract::auth";

/// Header carrying the refresh token.
///
/// Deliberately distinct from `Authorization` so the two token classes can
/// never be swapped by accident at the transport level.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Verified access token claims.
///
/// Extraction fails with 401 unless the request carries a structurally
/// valid, unexpired bearer token of class `access`.
#[derive(Debug, Clone)]
pub struct AccessClaims(pub AuthClaims);

impl<S> FromRequestParts<S> for AccessClaims
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Return cached claims if another extractor already verified them.
        if let Some(claims) = parts.extensions.get::<Self>() {
            return Ok(claims.clone());
        }

        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let auth_service = AuthService::from_ref(state);
        let claims = auth_service.authorize(&token, None)?;

        let extracted = Self(claims);
        parts.extensions.insert(extracted.clone());
        Ok(extracted)
    }
}

/// Verified access token claims with the admin role enforced.
///
/// Extraction fails with 401 for token problems and 403 when the token is
/// valid but the subject is not an administrator.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub AuthClaims);

impl<S> FromRequestParts<S> for AdminClaims
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let auth_service = AuthService::from_ref(state);
        let claims = auth_service.authorize(&token, Some(Role::Admin))?;

        Ok(Self(claims))
    }
}

/// The raw bearer token string from the `Authorization` header.
///
/// Used by handlers whose service operation takes the token itself (the
/// vault operations authorize internally). Carries no verification on its
/// own.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;

        match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(bearer_header) => Ok(Self(bearer_header.token().to_owned())),
            Err(rejection) => {
                let kind = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => {
                        tracing::debug!(
                            target: TRACING_TARGET,
                            "request rejected: no bearer token"
                        );
                        ErrorKind::MissingAuthToken
                    }
                    _ => {
                        tracing::debug!(
                            target: TRACING_TARGET,
                            "request rejected: authorization header is not a bearer token"
                        );
                        ErrorKind::MalformedAuthToken
                    }
                };
                Err(kind.into_error())
            }
        }
    }
}

/// The raw refresh token from the dedicated refresh header.
#[derive(Debug, Clone)]
pub struct RefreshToken(pub String);

impl<S> FromRequestParts<S> for RefreshToken
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(REFRESH_TOKEN_HEADER) else {
            tracing::debug!(
                target: TRACING_TARGET,
                "request rejected: no refresh token header"
            );
            return Err(ErrorKind::MissingAuthToken.into_error());
        };

        match value.to_str() {
            Ok(token) if !token.is_empty() => Ok(Self(token.to_owned())),
            _ => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "request rejected: refresh token header is not valid"
                );
                Err(ErrorKind::MalformedAuthToken.into_error())
            }
        }
    }
}
