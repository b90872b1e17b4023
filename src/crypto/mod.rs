//! Cryptographic primitives for the credential vault.
//!
//! This module provides:
//! - Argon2id PIN-based key derivation (`kdf`)
//! - AES-256-GCM authenticated encryption with associated data (`encryption`)

pub mod encryption;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, generate_nonce, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, generate_salt, KdfParams, VaultKey, KEY_LEN, SALT_LEN};
