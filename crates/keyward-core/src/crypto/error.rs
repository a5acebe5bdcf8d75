//! Cryptographic error types.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur while sealing or opening vault ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The ciphertext cannot even hold a nonce and an authentication tag.
    #[error("ciphertext too short to contain nonce and authentication tag")]
    CiphertextTooShort,
    /// Authentication failed: wrong key, truncation, or tampering.
    #[error("decryption failed: wrong key or corrupted ciphertext")]
    DecryptionFailed,
    /// The provided key material has the wrong length.
    #[error("invalid key length: expected 32 bytes")]
    InvalidKeyLength,
    /// The cipher itself rejected the operation.
    #[error("encryption failed")]
    EncryptionFailed,
}
