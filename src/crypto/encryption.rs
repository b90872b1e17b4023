//! AES-256-GCM authenticated encryption.
//!
//! The nonce is generated separately with [`generate_nonce`] so the caller
//! can record it in the file header before encrypting; the header bytes are
//! then passed as associated data and covered by the authentication tag.
//!
//! Output of [`encrypt`]: `ciphertext || 16-byte auth tag`.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::errors::{WpStackError, Result};

use super::kdf::VaultKey;

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Generate a fresh random 12-byte nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut out = [0u8; NONCE_LEN];
    out.copy_from_slice(&nonce);
    out
}

/// Encrypt and authenticate `plaintext`, binding `aad` into the tag.
pub fn encrypt(
    key: &VaultKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| WpStackError::Encryption(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| WpStackError::Encryption(format!("encryption error: {e}")))
}

/// Decrypt data produced by [`encrypt`].
///
/// A wrong key, a modified ciphertext, and modified associated data all fail
/// the same way: the tag check inside `aes-gcm` is constant-time and gives
/// no hint which input was wrong.
pub fn decrypt(
    key: &VaultKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < TAG_LEN {
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| WpStackError::WrongPinOrCorrupt)?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| WpStackError::WrongPinOrCorrupt)?;

    Ok(Zeroizing::new(plaintext))
}
