#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod memory;
mod model;
mod store;

pub use crate::error::{StoreError, StoreResult};
pub use crate::memory::MemoryStore;
pub use crate::model::{Principal, Role, VaultEntry};
pub use crate::store::{IdentityStore, SecretVault};
