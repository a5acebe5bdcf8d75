//! Domain records owned by the stores.

use serde::{Deserialize, Serialize};

/// Authorization role carried by every principal and embedded in every token.
///
/// The set is closed: anything outside it is rejected at the edge during
/// request deserialization, before storage is touched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// A regular end user.
    Client,
    /// An automated trading agent acting on behalf of a client.
    Bot,
}

/// A registered identity.
///
/// `id` is the single abstract identifier (email address or username,
/// depending on deployment configuration) and never changes after
/// registration. `password_hash` is a PHC-format string with the salt
/// embedded; the plaintext password is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier, stable for the lifetime of the account.
    pub id: String,
    /// Salted Argon2id hash in PHC string format.
    pub password_hash: String,
    /// Role assigned at registration.
    pub role: Role,
}

/// One principal's encrypted third-party API credentials.
///
/// Both fields hold AEAD ciphertext produced by the process-wide vault
/// cipher; plaintext never reaches the store. At most one entry exists per
/// owner, and storing again replaces the previous entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    /// Identifier of the owning principal.
    pub owner: String,
    /// Encrypted API key.
    pub encrypted_api_key: Vec<u8>,
    /// Encrypted API secret.
    pub encrypted_api_secret: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        for (role, text) in [
            (Role::Admin, "\"admin\""),
            (Role::Client, "\"client\""),
            (Role::Bot, "\"bot\""),
        ] {
            assert_eq!(serde_json::to_string(&role).unwrap(), text);
            assert_eq!(serde_json::from_str::<Role>(text).unwrap(), role);
        }
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
        assert!(Role::from_str("owner").is_err());
    }

    #[test]
    fn role_displays_lowercase() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Bot.to_string(), "bot");
    }
}
