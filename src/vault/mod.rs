//! Vault module: PIN-encrypted secret storage.
//!
//! This module provides:
//! - The `SecretStore` name -> value map (`secret`)
//! - Binary vault file format sealed with AES-256-GCM (`format`)
//! - The live-file slot with rollback and crash recovery (`slot`)
//! - The `Vault` handle and its read-merge-write protocol (`store`)
//! - Bounded PIN retry (`unlock`)

pub mod format;
pub mod secret;
pub mod slot;
pub mod store;
pub mod unlock;

// Re-export the most commonly used items.
pub use format::VaultHeader;
pub use secret::{validate_secret_name, SecretStore};
pub use slot::Recovery;
pub use store::{Vault, VAULT_FILE_NAME};
pub use unlock::{unlock_with_retry, DEFAULT_MAX_ATTEMPTS};
