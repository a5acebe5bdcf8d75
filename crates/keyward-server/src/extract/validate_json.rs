//! JSON extraction with payload validation.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::handler::{Error, ErrorKind, Result};

/// Tracing target for request payload extraction.
const TRACING_TARGET: &str = "keyward_server::extract::validate_json";

/// JSON body extractor that also runs `validator` rules.
///
/// Both a malformed body (including an unknown role value) and a payload
/// that fails field validation map to 400.
#[derive(Debug, Clone)]
pub struct ValidateJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidateJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = %rejection.body_text(),
                "request body rejected"
            );
            ErrorKind::BadRequest.with_context(rejection.body_text())
        })?;

        value.validate().map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = %e,
                "request payload failed validation"
            );
            ErrorKind::BadRequest.with_context(e.to_string())
        })?;

        Ok(Self(value))
    }
}
