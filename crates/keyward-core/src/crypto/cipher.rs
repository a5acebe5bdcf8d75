//! XChaCha20-Poly1305 sealing and opening of vault secrets.
//!
//! # Wire Format
//!
//! `nonce (24 bytes) || ciphertext || tag (16 bytes)`
//!
//! The 24-byte nonce is drawn from the system CSPRNG per encryption; the
//! extended nonce space makes random generation collision-safe without any
//! bookkeeping. The Poly1305 tag authenticates the whole message, so a
//! flipped bit anywhere fails the open instead of yielding garbage.

use chacha20poly1305::XChaCha20Poly1305;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};

use super::error::{CryptoError, CryptoResult};
use super::key::EncryptionKey;

/// Size of the XChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Smallest possible valid ciphertext: a nonce and a tag around an empty body.
pub const MIN_CIPHERTEXT_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypts `plaintext` under `key`, prepending the random nonce.
///
/// Two calls with identical inputs produce different ciphertext because the
/// nonce is fresh each time.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + sealed.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&sealed);

    Ok(result)
}

/// Decrypts ciphertext produced by [`encrypt`].
///
/// # Errors
///
/// - [`CryptoError::CiphertextTooShort`] when the input cannot hold a nonce
///   plus a tag.
/// - [`CryptoError::DecryptionFailed`] when authentication fails: the key is
///   wrong, or the data was truncated or tampered with.
pub fn decrypt(key: &EncryptionKey, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < MIN_CIPHERTEXT_SIZE {
        return Err(CryptoError::CiphertextTooShort);
    }

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_SIZE);
    let nonce = nonce_bytes.into();

    cipher
        .decrypt(nonce, sealed)
        .map_err(|_| CryptoError::DecryptionFailed)
}
