//! Mapping from auth service failures onto HTTP errors.

use crate::handler::error::{Error, ErrorKind};
use crate::service::AuthError;

/// Tracing target for auth error mapping.
const TRACING_TARGET: &str = "keyward_server::handler::auth_error";

impl From<AuthError> for Error<'static> {
    fn from(error: AuthError) -> Self {
        match error {
            // Context strings on validation errors are safe: they describe
            // the request shape, never account state.
            AuthError::Validation(reason) => ErrorKind::BadRequest.with_context(reason),
            AuthError::AlreadyExists => ErrorKind::Conflict.into_error(),
            // No message, no context: every authentication failure must
            // serialize to the identical response body.
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                ErrorKind::Unauthorized.into_error()
            }
            AuthError::Forbidden => ErrorKind::Forbidden.into_error(),
            AuthError::NotFound => ErrorKind::NotFound.into_error(),
            AuthError::Internal(source) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %source,
                    "internal auth service failure"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn credential_and_token_failures_map_to_the_same_kind() {
        let bad_credentials = Error::from(AuthError::InvalidCredentials);
        let bad_token = Error::from(AuthError::Unauthorized);

        assert_eq!(bad_credentials.kind(), bad_token.kind());
        assert_eq!(bad_credentials.kind().status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn status_code_mapping() {
        let cases = [
            (AuthError::Validation("bad id".into()), StatusCode::BAD_REQUEST),
            (AuthError::AlreadyExists, StatusCode::CONFLICT),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
        ];

        for (error, status) in cases {
            assert_eq!(Error::from(error).kind().status_code(), status);
        }
    }
}
