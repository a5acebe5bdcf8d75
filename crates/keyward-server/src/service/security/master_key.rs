//! Vault cipher key custody.
//!
//! The vault cipher uses a single 32-byte key for the whole process
//! lifetime, loaded once at startup from a file the operator provisions.
//! Restarting with a different key makes every previously stored vault entry
//! undecryptable; that is an operational constraint of the design, not a
//! recoverable condition, so nothing here regenerates or falls back.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use keyward_core::crypto::EncryptionKey;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tracing target for master key operations.
const TRACING_TARGET: &str = "keyward_server::security::master_key";

/// Master encryption key file path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct MasterKeyConfig {
    /// File path to the 32-byte vault encryption key.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "KEYWARD_ENCRYPTION_KEY_FILE",
            default_value = "./encryption.key"
        )
    )]
    #[serde(default = "MasterKeyConfig::default_key_path")]
    pub key_path: PathBuf,
}

impl MasterKeyConfig {
    fn default_key_path() -> PathBuf {
        "./encryption.key".into()
    }
}

impl Default for MasterKeyConfig {
    fn default() -> Self {
        Self {
            key_path: Self::default_key_path(),
        }
    }
}

/// The process-wide vault encryption key.
///
/// Thread-safe, read-only after construction. All vault entries are sealed
/// and opened under this one key.
#[derive(Clone)]
pub struct MasterKey {
    inner: Arc<EncryptionKey>,
}

impl MasterKey {
    /// Wraps an already constructed key (dependency injection and tests).
    #[must_use]
    pub fn new(key: EncryptionKey) -> Self {
        Self {
            inner: Arc::new(key),
        }
    }

    /// Loads the key from the path specified in `config`.
    ///
    /// The file must contain exactly 32 raw bytes.
    pub async fn from_config(config: &MasterKeyConfig) -> Result<Self> {
        Self::validate_path(&config.key_path)?;
        Self::load(&config.key_path).await
    }

    /// Returns a reference to the underlying [`EncryptionKey`].
    #[inline]
    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.inner
    }

    /// Validates that the key file exists and is a regular file.
    fn validate_path(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::config("Encryption key file does not exist"));
        }

        if !path.is_file() {
            return Err(Error::config("Encryption key path is not a file"));
        }

        Ok(())
    }

    /// Reads and parses the 32-byte key from disk.
    async fn load(path: &Path) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            "loading vault encryption key",
        );

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "failed to read encryption key file",
            );
            Error::file_system("Failed to read encryption key file").with_source(e)
        })?;

        let key = EncryptionKey::from_bytes(&bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "invalid encryption key: expected exactly 32 bytes",
            );
            Error::config("Invalid encryption key: expected exactly 32 bytes").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            "vault encryption key loaded",
        );

        Ok(Self::new(key))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn config_for(path: &Path) -> MasterKeyConfig {
        MasterKeyConfig {
            key_path: path.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn load_valid_key() {
        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join("encryption.key");
        fs::write(&key_path, [0xABu8; 32]).unwrap();

        let master_key = MasterKey::from_config(&config_for(&key_path)).await.unwrap();
        assert_eq!(master_key.encryption_key().as_bytes(), &[0xAB; 32]);
    }

    #[tokio::test]
    async fn reject_invalid_key_length() {
        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join("encryption.key");
        fs::write(&key_path, [0u8; 16]).unwrap();

        assert!(MasterKey::from_config(&config_for(&key_path)).await.is_err());
    }

    #[tokio::test]
    async fn reject_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join("nonexistent.key");

        assert!(MasterKey::from_config(&config_for(&key_path)).await.is_err());
    }

    #[test]
    fn debug_never_prints_key_material() {
        let master_key = MasterKey::new(EncryptionKey::generate());
        assert!(format!("{master_key:?}").contains("REDACTED"));
    }
}
