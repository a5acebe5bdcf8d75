//! JWT claim set for bearer credentials.

use std::borrow::Cow;

use jiff::{SignedDuration, Timestamp};
use keyward_store::Role;
use serde::{Deserialize, Serialize};

/// Token class discriminator.
///
/// Carried as a dedicated `cls` claim so the two classes are structurally
/// distinct: a refresh token can never pass a check expecting an access
/// token, regardless of how its lifetime compares.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenClass {
    /// Short-lived token accepted by protected endpoints.
    Access,
    /// Long-lived token accepted only by the refresh endpoint.
    Refresh,
}

/// Claims embedded in every issued token.
///
/// Standard claims (`iss`, `aud`, `sub`, `iat`, `exp`) follow RFC 7519;
/// `role` and `cls` are service-specific. Timestamps serialize as integer
/// seconds since the epoch, the representation JWT expiry validation
/// expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    issued_by: Cow<'static, str>,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    audience: Cow<'static, str>,

    /// Subject: the principal identifier this token represents.
    #[serde(rename = "sub")]
    pub subject: String,
    /// Role of the subject at issuance time.
    pub role: Role,
    /// Token class discriminator.
    #[serde(rename = "cls")]
    pub class: TokenClass,

    /// Issued at (UTC, integer seconds).
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time (UTC, integer seconds).
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl AuthClaims {
    /// JWT audience identifier for tokens issued by this service.
    pub(crate) const AUDIENCE: &'static str = "keyward:server";
    /// JWT issuer identifier for tokens issued by this service.
    pub(crate) const ISSUER: &'static str = "keyward";

    /// Builds a claim set expiring `ttl` from now.
    pub fn new(subject: impl Into<String>, role: Role, class: TokenClass, ttl: SignedDuration) -> Self {
        let issued_at = Timestamp::now();
        Self {
            issued_by: Cow::Borrowed(Self::ISSUER),
            audience: Cow::Borrowed(Self::AUDIENCE),
            subject: subject.into(),
            role,
            class,
            issued_at,
            expires_at: issued_at
                .saturating_add(ttl)
                .expect("adding a SignedDuration to a timestamp never overflows"),
        }
    }

    /// Whether this token has expired.
    ///
    /// The boundary counts as expired: a token whose expiry equals the
    /// current instant is already invalid.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns the remaining lifetime, or zero if already expired.
    #[inline]
    #[must_use]
    pub fn remaining_lifetime(&self) -> SignedDuration {
        let remaining = self.expires_at.duration_since(Timestamp::now());
        remaining.max(SignedDuration::ZERO)
    }
}
