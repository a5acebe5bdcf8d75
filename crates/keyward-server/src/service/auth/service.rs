//! Authentication and authorization orchestration.
//!
//! [`AuthService`] is the only component that touches more than one security
//! primitive at a time. Every dependency is injected at construction; there
//! are no module-level handles or process globals, so two differently
//! configured instances can coexist in one process (the test suite relies on
//! this).

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use keyward_core::crypto;
use keyward_store::{IdentityStore, Principal, Role, SecretVault, StoreError, VaultEntry};
use validator::ValidateEmail;

use super::claims::{AuthClaims, TokenClass};
use super::codec::TokenCodec;
use crate::Error;
use crate::service::config::IdentityKind;
use crate::service::security::{MasterKey, PasswordHasher};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "keyward_server::auth::service";

/// Failures surfaced by [`AuthService`] operations.
///
/// Handlers map these onto HTTP error kinds; the variants already encode the
/// coarse client-facing distinctions the API is allowed to reveal.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Malformed or missing input: bad identifier format, empty password.
    #[error("invalid input: {0}")]
    Validation(Cow<'static, str>),
    /// A principal with this identifier is already registered.
    #[error("principal already exists")]
    AlreadyExists,
    /// Unknown identifier or wrong password. One variant for both, so the
    /// response can never reveal whether the identifier exists.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Token verification failed (malformed, expired, or wrong class).
    #[error("authentication required")]
    Unauthorized,
    /// Valid identity, insufficient role.
    #[error("insufficient role")]
    Forbidden,
    /// No vault entry exists for the authenticated principal.
    #[error("no stored credentials")]
    NotFound,
    /// An internal failure that must not leak detail to the caller.
    #[error("authentication service failure")]
    Internal(#[from] Error),
}

/// Both tokens handed out at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived token for protected endpoints.
    pub access_token: String,
    /// Long-lived token for the refresh endpoint.
    pub refresh_token: String,
}

/// Decrypted third-party API credentials.
///
/// `Debug` is redacted: this is the one type in the crate that carries
/// plaintext secrets, and it must never end up in a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// The third-party API key.
    pub api_key: String,
    /// The third-party API secret.
    pub api_secret: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Orchestrates registration, login, token refresh, authorization, and the
/// encrypted secret vault.
///
/// Cheap to clone; all state is behind an `Arc` and read-only after
/// construction except for what the injected stores manage themselves.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

struct AuthServiceInner {
    identity: Arc<dyn IdentityStore>,
    vault: Arc<dyn SecretVault>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    master_key: MasterKey,
    identity_kind: IdentityKind,
}

impl AuthService {
    /// Creates the service from its injected dependencies.
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        vault: Arc<dyn SecretVault>,
        hasher: PasswordHasher,
        codec: TokenCodec,
        master_key: MasterKey,
        identity_kind: IdentityKind,
    ) -> Self {
        Self {
            inner: Arc::new(AuthServiceInner {
                identity,
                vault,
                hasher,
                codec,
                master_key,
                identity_kind,
            }),
        }
    }

    /// Registers a new principal.
    ///
    /// The identifier is validated against the configured identity kind and
    /// normalized before storage. Insertion is a single atomic
    /// insert-if-absent, so concurrent registrations for the same identifier
    /// cannot both succeed.
    pub async fn register(
        &self,
        id: &str,
        password: &str,
        role: Role,
    ) -> Result<Principal, AuthError> {
        let id = self.validate_identity(id)?;

        if password.is_empty() {
            return Err(AuthError::Validation("password must not be empty".into()));
        }

        let password_hash = self.hash_password(password.to_owned()).await?;

        let principal = Principal {
            id: id.clone(),
            password_hash,
            role,
        };

        match self.inner.identity.insert(principal.clone()).await {
            Ok(()) => {}
            Err(StoreError::Conflict) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    id = %id,
                    "registration rejected: identifier already exists"
                );
                return Err(AuthError::AlreadyExists);
            }
            Err(e) => return Err(store_failure(e).into()),
        }

        tracing::info!(
            target: TRACING_TARGET,
            id = %id,
            role = %role,
            "principal registered"
        );

        Ok(principal)
    }

    /// Verifies credentials and issues an access/refresh token pair.
    ///
    /// Unknown identifier and wrong password are indistinguishable to the
    /// caller: both cost one hash verification and both return
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, id: &str, password: &str) -> Result<TokenPair, AuthError> {
        let id = self.normalize_identity(id);
        let principal = match self.inner.identity.find(&id).await {
            Ok(found) => found,
            Err(e) => return Err(store_failure(e).into()),
        };

        let password = password.to_owned();
        let verified = match &principal {
            Some(principal) => {
                let stored_hash = principal.password_hash.clone();
                self.run_hashing(move |hasher| hasher.verify(&password, &stored_hash))
                    .await?
            }
            None => {
                // Same CPU cost as a real verification so response timing
                // cannot reveal whether the identifier is registered.
                self.run_hashing(move |hasher| hasher.verify_dummy(&password))
                    .await?
            }
        };

        let Some(principal) = principal.filter(|_| verified) else {
            tracing::warn!(
                target: TRACING_TARGET,
                id = %id,
                "login failed"
            );
            return Err(AuthError::InvalidCredentials);
        };

        let codec = &self.inner.codec;
        let access_token = codec.issue(
            &principal.id,
            principal.role,
            TokenClass::Access,
            codec.ttl_for(TokenClass::Access),
        )?;
        let refresh_token = codec.issue(
            &principal.id,
            principal.role,
            TokenClass::Refresh,
            codec.ttl_for(TokenClass::Refresh),
        )?;

        tracing::info!(
            target: TRACING_TARGET,
            id = %principal.id,
            role = %principal.role,
            "login successful: token pair issued"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a valid refresh token for a fresh access token.
    ///
    /// Every verification failure collapses to [`AuthError::Unauthorized`];
    /// the finer reason is logged only.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.verify_or_unauthorized(refresh_token, TokenClass::Refresh)?;

        let codec = &self.inner.codec;
        let access_token = codec.issue(
            &claims.subject,
            claims.role,
            TokenClass::Access,
            codec.ttl_for(TokenClass::Access),
        )?;

        tracing::debug!(
            target: TRACING_TARGET,
            subject = %claims.subject,
            "access token refreshed"
        );

        Ok(access_token)
    }

    /// The single authorization choke point for protected operations.
    ///
    /// Verifies the token as class `access`, then optionally gates on role.
    /// Returns the verified claims; callers must use `claims.subject` for
    /// any per-principal lookup and never a client-supplied identity.
    pub fn authorize(
        &self,
        access_token: &str,
        required_role: Option<Role>,
    ) -> Result<AuthClaims, AuthError> {
        let claims = self.verify_or_unauthorized(access_token, TokenClass::Access)?;

        if let Some(required) = required_role
            && claims.role != required
        {
            tracing::warn!(
                target: TRACING_TARGET,
                subject = %claims.subject,
                role = %claims.role,
                required = %required,
                "authorization denied: insufficient role"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(claims)
    }

    /// Encrypts and stores API credentials for the authenticated principal.
    ///
    /// The vault is keyed by the verified token subject; a client-supplied
    /// owner never enters the picture. Storing again overwrites the previous
    /// entry. Returns the verified owner identifier.
    pub async fn store_secret(
        &self,
        access_token: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<String, AuthError> {
        let claims = self.authorize(access_token, None)?;

        let key = self.inner.master_key.encryption_key();
        let encrypted_api_key =
            crypto::encrypt(key, api_key.as_bytes()).map_err(crypto_failure)?;
        let encrypted_api_secret =
            crypto::encrypt(key, api_secret.as_bytes()).map_err(crypto_failure)?;

        let entry = VaultEntry {
            owner: claims.subject.clone(),
            encrypted_api_key,
            encrypted_api_secret,
        };

        self.inner
            .vault
            .upsert(entry)
            .await
            .map_err(store_failure)?;

        tracing::info!(
            target: TRACING_TARGET,
            owner = %claims.subject,
            "api credentials stored"
        );

        Ok(claims.subject)
    }

    /// Retrieves and decrypts the authenticated principal's API credentials.
    ///
    /// A failed decryption means the stored ciphertext no longer matches the
    /// process key; it surfaces as an internal failure, never as garbage
    /// plaintext.
    pub async fn read_secret(&self, access_token: &str) -> Result<ApiCredentials, AuthError> {
        let claims = self.authorize(access_token, None)?;

        let entry = match self.inner.vault.find(&claims.subject).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(AuthError::NotFound),
            Err(e) => return Err(store_failure(e).into()),
        };

        let key = self.inner.master_key.encryption_key();
        let api_key = crypto::decrypt(key, &entry.encrypted_api_key).map_err(|e| {
            vault_integrity_failure(&claims.subject, e)
        })?;
        let api_secret = crypto::decrypt(key, &entry.encrypted_api_secret).map_err(|e| {
            vault_integrity_failure(&claims.subject, e)
        })?;

        let api_key = String::from_utf8(api_key)
            .map_err(|e| Error::internal("Decrypted credential is not valid UTF-8").with_source(e))?;
        let api_secret = String::from_utf8(api_secret)
            .map_err(|e| Error::internal("Decrypted credential is not valid UTF-8").with_source(e))?;

        Ok(ApiCredentials {
            api_key,
            api_secret,
        })
    }

    /// Verifies a token, collapsing the three-way failure taxonomy into
    /// `Unauthorized` after recording the precise reason.
    fn verify_or_unauthorized(
        &self,
        token: &str,
        expected_class: TokenClass,
    ) -> Result<AuthClaims, AuthError> {
        self.inner.codec.verify(token, expected_class).map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = %e,
                expected_class = %expected_class,
                "token rejected"
            );
            AuthError::Unauthorized
        })
    }

    /// Validates and normalizes an identifier per the configured kind.
    fn validate_identity(&self, id: &str) -> Result<String, AuthError> {
        let id = self.normalize_identity(id);

        match self.inner.identity_kind {
            IdentityKind::EmailAddress => {
                if !id.validate_email() {
                    return Err(AuthError::Validation(
                        "identifier must be a valid email address".into(),
                    ));
                }
            }
            IdentityKind::Username => {
                let valid_len = (3..=64).contains(&id.len());
                let valid_chars = id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
                if !valid_len || !valid_chars {
                    return Err(AuthError::Validation(
                        "identifier must be 3-64 characters of letters, digits, '.', '_' or '-'"
                            .into(),
                    ));
                }
            }
        }

        Ok(id)
    }

    /// Normalizes an identifier without validating it (login path).
    fn normalize_identity(&self, id: &str) -> String {
        match self.inner.identity_kind {
            IdentityKind::EmailAddress => id.trim().to_lowercase(),
            IdentityKind::Username => id.trim().to_owned(),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let result = self
            .run_hashing(move |hasher| hasher.hash(&password))
            .await?;
        result.map_err(AuthError::from)
    }

    /// Runs a hashing closure off the async workers.
    ///
    /// Argon2 burns tens of milliseconds of CPU per call; on the request
    /// path that must not block the runtime's worker threads.
    async fn run_hashing<T, F>(&self, f: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce(&PasswordHasher) -> T + Send + 'static,
    {
        let hasher = self.inner.hasher.clone();
        tokio::task::spawn_blocking(move || f(&hasher))
            .await
            .map_err(|e| {
                AuthError::Internal(
                    Error::internal("Password hashing task failed").with_source(e),
                )
            })
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("identity_kind", &self.inner.identity_kind)
            .field("codec", &self.inner.codec)
            .finish_non_exhaustive()
    }
}

fn store_failure(error: StoreError) -> Error {
    Error::internal("Store operation failed").with_source(error)
}

fn crypto_failure(error: keyward_core::crypto::CryptoError) -> AuthError {
    AuthError::Internal(Error::internal("Vault encryption failed").with_source(error))
}

fn vault_integrity_failure(owner: &str, error: keyward_core::crypto::CryptoError) -> AuthError {
    tracing::error!(
        target: TRACING_TARGET,
        owner = %owner,
        error = %error,
        "vault entry failed integrity check; entry is unrecoverable under the current key"
    );
    AuthError::Internal(Error::internal("Vault entry failed integrity check").with_source(error))
}
