//! Authenticated encryption for secrets at rest.
//!
//! Vault entries are sealed with XChaCha20-Poly1305, an AEAD construction
//! that provides both confidentiality and tamper detection. Ciphertext is
//! self-describing: the random nonce is carried inline, so callers store a
//! single opaque byte string and nothing else.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyward_core::crypto::{EncryptionKey, encrypt, decrypt};
//!
//! let key = EncryptionKey::generate();
//! let sealed = encrypt(&key, b"api-secret")?;
//! assert_eq!(decrypt(&key, &sealed)?, b"api-secret");
//! ```

mod cipher;
mod error;
mod key;

pub use cipher::{MIN_CIPHERTEXT_SIZE, NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use error::{CryptoError, CryptoResult};
pub use key::{EncryptionKey, KEY_SIZE};
