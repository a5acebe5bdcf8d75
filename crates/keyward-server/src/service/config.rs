//! Service configuration.

use derive_builder::Builder;
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::service::auth::TokenCodec;
use crate::service::security::{MasterKey, MasterKeyConfig, PasswordHasher};
use crate::Result;

/// Default values for configuration options.
mod defaults {
    /// Default access token lifetime: one hour.
    pub const ACCESS_TOKEN_TTL_SECS: u64 = 3_600;

    /// Default refresh token lifetime: seven days.
    pub const REFRESH_TOKEN_TTL_SECS: u64 = 604_800;

    /// Development-only signing secret. Release builds require an explicit
    /// secret from the environment.
    #[cfg(debug_assertions)]
    pub fn signing_secret() -> String {
        "keyward-dev-signing-secret-do-not-deploy".to_owned()
    }
}

/// Which concrete string the abstract principal identifier is.
///
/// One deployment makes exactly one choice; mixing kinds in a single store
/// is not supported, and registration enforces the configured format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[cfg_attr(any(test, feature = "config"), derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IdentityKind {
    /// Principals register with an email address (normalized to lowercase).
    #[default]
    EmailAddress,
    /// Principals register with a username.
    Username,
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Symmetric secret used to sign and verify bearer tokens.
    ///
    /// Supplied via environment or configuration; at least 32 bytes.
    pub token_signing_secret: String,

    /// Access token lifetime in seconds.
    #[builder(default = "defaults::ACCESS_TOKEN_TTL_SECS")]
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    #[builder(default = "defaults::REFRESH_TOKEN_TTL_SECS")]
    pub refresh_token_ttl_secs: u64,

    /// Location of the vault encryption key.
    #[builder(default)]
    pub master_key: MasterKeyConfig,

    /// Concrete kind of the principal identifier.
    #[builder(default)]
    pub identity_kind: IdentityKind,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Creates the password hasher.
    pub fn create_password_hasher(&self) -> Result<PasswordHasher> {
        PasswordHasher::new()
    }

    /// Creates the token codec from the configured secret and lifetimes.
    pub fn create_token_codec(&self) -> Result<TokenCodec> {
        TokenCodec::new(
            self.token_signing_secret.as_bytes(),
            SignedDuration::from_secs(self.access_token_ttl_secs as i64),
            SignedDuration::from_secs(self.refresh_token_ttl_secs as i64),
        )
    }

    /// Loads the vault encryption key from the configured path.
    pub async fn load_master_key(&self) -> Result<MasterKey> {
        MasterKey::from_config(&self.master_key).await
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> std::result::Result<(), String> {
        if let Some(secret) = &builder.token_signing_secret
            && secret.len() < 32
        {
            return Err("Token signing secret must be at least 32 bytes".to_string());
        }

        if let Some(ttl) = &builder.access_token_ttl_secs
            && *ttl == 0
        {
            return Err("Access token lifetime must be greater than 0".to_string());
        }

        if let Some(ttl) = &builder.refresh_token_ttl_secs
            && *ttl == 0
        {
            return Err("Refresh token lifetime must be greater than 0".to_string());
        }

        if let (Some(access), Some(refresh)) = (
            &builder.access_token_ttl_secs,
            &builder.refresh_token_ttl_secs,
        ) && access > refresh
        {
            return Err(
                "Refresh token lifetime must not be shorter than the access token lifetime"
                    .to_string(),
            );
        }

        Ok(())
    }
}

#[cfg(debug_assertions)]
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            token_signing_secret: defaults::signing_secret(),
            access_token_ttl_secs: defaults::ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: defaults::REFRESH_TOKEN_TTL_SECS,
            master_key: MasterKeyConfig::default(),
            identity_kind: IdentityKind::default(),
        }
    }
}
