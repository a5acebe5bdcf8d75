//! Signing and verification of bearer tokens.

use std::fmt;
use std::sync::Arc;

use jiff::SignedDuration;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use keyward_store::Role;

use super::claims::{AuthClaims, TokenClass};
use crate::{Error, Result};

/// Tracing target for token codec operations.
const TRACING_TARGET: &str = "keyward_server::auth::codec";

/// Minimum accepted length for the signing secret, in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Verification failure taxonomy.
///
/// Callers collapse all three onto one client-facing `unauthorized`
/// response, but the distinction is preserved here for logs and for any
/// future revocation logic that needs to tell the cases apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token cannot be parsed or its signature does not verify.
    #[error("token is malformed or its signature does not verify")]
    Malformed,
    /// The token is structurally valid but past its expiry.
    #[error("token has expired")]
    Expired,
    /// The token is valid but of the wrong class for this operation.
    #[error("token class is not accepted here")]
    WrongClass,
}

/// Signs and verifies compact self-contained bearer tokens.
///
/// HMAC-SHA256 over `header.payload` with a single process-wide secret
/// supplied through configuration. The codec is cheap to clone and safe to
/// share: keys are read-only after construction.
#[derive(Clone)]
pub struct TokenCodec {
    inner: Arc<CodecInner>,
}

struct CodecInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: SignedDuration,
    refresh_ttl: SignedDuration,
}

impl TokenCodec {
    /// Creates a codec from the signing secret and per-class lifetimes.
    ///
    /// # Errors
    ///
    /// Rejects secrets shorter than 32 bytes and non-positive lifetimes.
    pub fn new(
        secret: &[u8],
        access_ttl: SignedDuration,
        refresh_ttl: SignedDuration,
    ) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(
                "Token signing secret must be at least 32 bytes",
            ));
        }

        if access_ttl <= SignedDuration::ZERO || refresh_ttl <= SignedDuration::ZERO {
            return Err(Error::config("Token lifetimes must be positive"));
        }

        let inner = CodecInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the configured lifetime for a token class.
    #[inline]
    #[must_use]
    pub fn ttl_for(&self, class: TokenClass) -> SignedDuration {
        match class {
            TokenClass::Access => self.inner.access_ttl,
            TokenClass::Refresh => self.inner.refresh_ttl,
        }
    }

    /// Issues a signed token for `subject` with the given role, class, and
    /// lifetime.
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        class: TokenClass,
        ttl: SignedDuration,
    ) -> Result<String> {
        let claims = AuthClaims::new(subject, role, class, ttl);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.inner.encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                subject = %claims.subject,
                class = %class,
                "failed to encode token"
            );
            Error::auth("Token generation failed").with_source(e)
        })
    }

    /// Verifies a token and checks it carries the expected class.
    ///
    /// Three checks in order: signature/structure, expiry, class. Only when
    /// all pass does the claim set come back. Expiry uses zero leeway and a
    /// post-decode boundary check, so `exp == now` is already expired.
    pub fn verify(
        &self,
        token: &str,
        expected_class: TokenClass,
    ) -> std::result::Result<AuthClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = true;
        validation.set_audience(&[AuthClaims::AUDIENCE]);
        validation.set_issuer(&[AuthClaims::ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "exp"]);

        let token_data = decode::<AuthClaims>(token, &self.inner.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        "token verification failed: expired"
                    );
                    TokenError::Expired
                }
                kind => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        reason = ?kind,
                        "token verification failed: malformed"
                    );
                    TokenError::Malformed
                }
            })?;

        let claims = token_data.claims;

        // The library treats exp == now as still valid; the boundary is
        // expired here.
        if claims.is_expired() {
            tracing::debug!(
                target: TRACING_TARGET,
                subject = %claims.subject,
                expires_at = %claims.expires_at,
                "token verification failed: expired at boundary"
            );
            return Err(TokenError::Expired);
        }

        if claims.class != expected_class {
            tracing::warn!(
                target: TRACING_TARGET,
                subject = %claims.subject,
                presented = %claims.class,
                expected = %expected_class,
                "token verification failed: wrong class"
            );
            return Err(TokenError::WrongClass);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.inner.access_ttl)
            .field("refresh_ttl", &self.inner.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            b"unit-test-signing-secret-0123456789abcdef",
            SignedDuration::from_secs(3600),
            SignedDuration::from_secs(86400 * 7),
        )
        .unwrap()
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = TokenCodec::new(
            b"too short",
            SignedDuration::from_secs(3600),
            SignedDuration::from_secs(86400),
        );
        assert!(result.is_err());
    }

    #[test]
    fn issue_and_verify_access_token() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", Role::Client, TokenClass::Access, codec.ttl_for(TokenClass::Access))
            .unwrap();

        let claims = codec.verify(&token, TokenClass::Access).unwrap();
        assert_eq!(claims.subject, "a@x.com");
        assert_eq!(claims.role, Role::Client);
        assert_eq!(claims.class, TokenClass::Access);
    }

    #[test]
    fn wire_format_is_three_segments() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", Role::Admin, TokenClass::Access, SignedDuration::from_secs(60))
            .unwrap();

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn class_confusion_is_rejected_both_ways() {
        let codec = codec();

        let access = codec
            .issue("a@x.com", Role::Client, TokenClass::Access, SignedDuration::from_secs(60))
            .unwrap();
        let refresh = codec
            .issue("a@x.com", Role::Client, TokenClass::Refresh, SignedDuration::from_secs(60))
            .unwrap();

        assert_eq!(
            codec.verify(&access, TokenClass::Refresh),
            Err(TokenError::WrongClass)
        );
        assert_eq!(
            codec.verify(&refresh, TokenClass::Access),
            Err(TokenError::WrongClass)
        );
    }

    #[test]
    fn zero_ttl_token_is_expired_immediately() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", Role::Client, TokenClass::Access, SignedDuration::ZERO)
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn long_expired_token_is_expired() {
        let codec = codec();
        let token = codec
            .issue(
                "a@x.com",
                Role::Client,
                TokenClass::Refresh,
                SignedDuration::from_secs(-3600),
            )
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Refresh),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn tampered_token_is_malformed() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", Role::Client, TokenClass::Access, SignedDuration::from_secs(60))
            .unwrap();

        // Flip a character in the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(
            codec.verify(&tampered, TokenClass::Access),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(
            codec.verify("not.a.token", TokenClass::Access),
            Err(TokenError::Malformed)
        );
        assert_eq!(codec.verify("", TokenClass::Access), Err(TokenError::Malformed));
    }

    #[test]
    fn token_signed_with_different_secret_is_malformed() {
        let codec = codec();
        let other = TokenCodec::new(
            b"another-signing-secret-fedcba9876543210",
            SignedDuration::from_secs(3600),
            SignedDuration::from_secs(86400),
        )
        .unwrap();

        let token = other
            .issue("a@x.com", Role::Client, TokenClass::Access, SignedDuration::from_secs(60))
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenClass::Access),
            Err(TokenError::Malformed)
        );
    }
}
