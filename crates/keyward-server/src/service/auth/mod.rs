//! Credential lifecycle: claims, token codec, and orchestration.

mod claims;
mod codec;
mod service;

pub use self::claims::{AuthClaims, TokenClass};
pub use self::codec::{TokenCodec, TokenError};
pub use self::service::{ApiCredentials, AuthError, AuthService, TokenPair};
