//! Password hashing and verification using Argon2id.
//!
//! One hasher instance is shared by the whole service. Hashing is
//! deliberately expensive; callers on the request path must run it via
//! [`tokio::task::spawn_blocking`] so a slow hash cannot stall unrelated
//! requests (the auth service does this, handlers never call in here
//! directly).

use argon2::password_hash::Error as ArgonError;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
};

use crate::{Error, Result};

/// Tracing target for password hashing operations.
const TRACING_TARGET: &str = "keyward_server::security::password_hasher";

/// Argon2id password hasher with OWASP recommended parameters.
///
/// Every hash call embeds a fresh random salt, so hashing the same password
/// twice yields different PHC strings that both verify. Verification is
/// timing-safe and fails closed: a malformed stored hash verifies as false
/// rather than erroring out.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with OWASP recommended configuration.
    ///
    /// Parameters: 19456 KiB memory, 2 iterations, 1 thread.
    ///
    /// # Errors
    ///
    /// Returns a service error if Argon2 initialization fails.
    pub fn new() -> Result<Self> {
        let params = Params::new(
            19456, // 19 MiB - OWASP recommended
            2,     // 2 iterations - OWASP recommended
            1,     // 1 thread - OWASP recommended
            None,  // default output length (32 bytes)
        )
        .map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to create Argon2 parameters"
            );

            Error::config("Invalid password hashing configuration")
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        // Hash one throwaway password up front so verify_dummy performs the
        // exact same amount of work as a real verification.
        let dummy_password = Self::random_password();
        let dummy_hash = Self::hash_with(&argon2, &dummy_password)?;

        Ok(Self { argon2, dummy_hash })
    }

    /// Hashes a password with a fresh cryptographically secure salt.
    ///
    /// Returns a PHC string embedding the algorithm, parameters, salt, and
    /// digest, suitable for long-term storage.
    ///
    /// # Errors
    ///
    /// Rejects empty passwords; an empty secret must never be silently
    /// accepted even if upstream validation failed to catch it. Also fails
    /// if salt generation or the hash operation itself fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        if password.is_empty() {
            return Err(Error::auth("Refusing to hash an empty password"));
        }

        Self::hash_with(&self.argon2, password)
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// Returns `false` both for a wrong password and for a stored hash that
    /// cannot be parsed. The latter is logged: a malformed hash in storage
    /// means corruption, not a user mistake, but the caller still sees a
    /// plain verification failure.
    #[must_use]
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "stored password hash is malformed; treating as verification failure"
                );
                return false;
            }
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => true,
            Err(ArgonError::PasswordInvalid) => false,
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                false
            }
        }
    }

    /// Burns the same CPU as a real verification, then fails.
    ///
    /// Called when the looked-up principal does not exist, so login takes
    /// the same time whether or not the identifier is registered. Always
    /// returns `false`.
    #[must_use]
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }

    fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String> {
        let password_hash = argon2.hash_password(password.as_bytes()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "password hashing operation failed"
            );
            Error::auth("Password processing failed").with_source(e)
        })?;

        Ok(password_hash.to_string())
    }

    fn random_password() -> String {
        use rand::RngExt;

        let password_len = rand::random_range(16..32);
        (0..password_len)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let password = "correct horse battery staple";
        let hash = hasher.hash(password)?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong password", &hash));

        Ok(())
    }

    #[test]
    fn each_hash_embeds_a_unique_salt() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        let password = "repeated input";

        let hash1 = hasher.hash(password)?;
        let hash2 = hasher.hash(password)?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));

        Ok(())
    }

    #[test]
    fn empty_password_is_rejected() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        assert!(hasher.hash("").is_err());
        Ok(())
    }

    #[test]
    fn malformed_stored_hash_verifies_false() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        Ok(())
    }

    #[test]
    fn dummy_verification_always_fails() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new()?;
        assert!(!hasher.verify_dummy("whatever"));
        Ok(())
    }
}
