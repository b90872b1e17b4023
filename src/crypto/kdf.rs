//! PIN-based key derivation using Argon2id.
//!
//! Argon2id is memory-hard, so even a short PIN costs an attacker a full
//! 64 MB hash per guess at the default parameters.  Parameters are stored in
//! every vault header, so files written with different settings stay readable.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{WpStackError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Upper bounds for every file, written or read.  A corrupted header must not
/// be able to make us allocate gigabytes or spin for minutes before failing.
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;
pub const MAX_ITERATIONS: u32 = 64;
pub const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Check the parameters against the accepted range.
    ///
    /// Writes and reads share this range: anything written here must also
    /// open again.  Out-of-range settings are reported as an encryption
    /// failure.
    pub fn check_bounds(&self) -> Result<()> {
        check_range("memory_kib", self.memory_kib, MIN_MEMORY_KIB, MAX_MEMORY_KIB)?;
        check_range("iterations", self.iterations, 1, MAX_ITERATIONS)?;
        check_range("parallelism", self.parallelism, 1, MAX_PARALLELISM)
    }

    /// Returns `true` if these parameters could have been written by us.
    ///
    /// Parameters read from disk that fail this check mean the header is
    /// damaged; they are never handed to Argon2.
    pub fn is_plausible(&self) -> bool {
        self.check_bounds().is_ok()
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<()> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(WpStackError::Encryption(format!(
        "Argon2 {field} must be between {min} and {max} (got {value})"
    )))
}

/// A 32-byte vault key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl PartialEq for VaultKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}

/// Derive a 32-byte key from a PIN and salt with explicit Argon2id params.
///
/// The same PIN + salt + params always produce the same key.
pub fn derive_key(pin: &[u8], salt: &[u8], params: &KdfParams) -> Result<VaultKey> {
    params.check_bounds()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| WpStackError::Encryption(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = VaultKey {
        bytes: [0u8; KEY_LEN],
    };
    argon2
        .hash_password_into(pin, salt, &mut key.bytes)
        .map_err(|e| WpStackError::Encryption(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
