//! Custom axum extractors.

mod auth;
mod validate_json;

pub use self::auth::{
    AccessClaims, AdminClaims, BearerToken, REFRESH_TOKEN_HEADER, RefreshToken,
};
pub use self::validate_json::ValidateJson;
