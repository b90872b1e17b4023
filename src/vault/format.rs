//! Binary vault file format.
//!
//! A `secrets.vault` file has this layout:
//!
//! ```text
//! [WPSV: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][AES-256-GCM ciphertext + tag]
//! ```
//!
//! - **Magic** (`WPSV`): identifies the file as a wpstack vault.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the ciphertext begins.
//! - **Header JSON**: serialized `VaultHeader` (KDF params, salt, nonce,
//!   timestamps).
//! - **Ciphertext**: the encrypted `SecretStore` JSON.
//!
//! Everything before the ciphertext is passed to AES-GCM as associated
//! data, so the tag covers the header as well as the secrets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::secret::SecretStore;
use crate::crypto::{self, KdfParams, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::errors::{WpStackError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"WPSV";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

/// Headers are a few hundred bytes; anything far larger is damage.
const MAX_HEADER_LEN: usize = 16 * 1024;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Metadata stored in cleartext (but authenticated) at the start of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version, repeated from the binary prefix.
    pub version: u8,

    /// Argon2id parameters used to derive the key for this file.
    pub kdf: KdfParams,

    /// The Argon2id salt (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// The AES-GCM nonce (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub nonce: Vec<u8>,

    /// When the vault was first created.  Carried over on every rewrite.
    pub created_at: DateTime<Utc>,

    /// When this file was written.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Encrypt a `SecretStore` under `pin` into a complete vault file image.
///
/// A fresh salt and nonce are generated on every call, so encrypting the
/// same store twice never produces the same bytes.  `created_at` is kept
/// from the previous file when there is one.
pub fn seal(
    store: &SecretStore,
    pin: &[u8],
    params: &KdfParams,
    created_at: Option<DateTime<Utc>>,
) -> Result<Vec<u8>> {
    let salt = crypto::generate_salt();
    let nonce = crypto::generate_nonce();
    let key = crypto::derive_key(pin, &salt, params)?;

    let now = Utc::now();
    let header = VaultHeader {
        version: CURRENT_VERSION,
        kdf: *params,
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        created_at: created_at.unwrap_or(now),
        updated_at: now,
    };

    let header_bytes = serde_json::to_vec(&header)
        .map_err(|e| WpStackError::Serialization(format!("header: {e}")))?;
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        WpStackError::Serialization(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + TAG_LEN);
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON

    let plaintext = store.to_plaintext()?;
    let ciphertext = crypto::encrypt(&key, &nonce, &plaintext, &buf)?;
    buf.extend_from_slice(&ciphertext);

    Ok(buf)
}

/// Decrypt a vault file image produced by [`seal`].
///
/// Every way this can fail (bad framing, bad header, implausible KDF
/// parameters, wrong PIN, flipped bits, malformed plaintext) is reported
/// as `WrongPinOrCorrupt`.
pub fn open(data: &[u8], pin: &[u8]) -> Result<(VaultHeader, SecretStore)> {
    let (header, aad_len) = parse_header(data)?;
    let (aad, ciphertext) = data.split_at(aad_len);

    let salt: [u8; SALT_LEN] = header
        .salt
        .as_slice()
        .try_into()
        .map_err(|_| WpStackError::WrongPinOrCorrupt)?;
    let nonce: [u8; NONCE_LEN] = header
        .nonce
        .as_slice()
        .try_into()
        .map_err(|_| WpStackError::WrongPinOrCorrupt)?;

    let key = crypto::derive_key(pin, &salt, &header.kdf)
        .map_err(|_| WpStackError::WrongPinOrCorrupt)?;
    let plaintext = crypto::decrypt(&key, &nonce, ciphertext, aad)?;
    let store = SecretStore::from_plaintext(&plaintext)?;

    Ok((header, store))
}

/// Read the cleartext header without a PIN.
///
/// Nothing in the header is trusted until [`open`] has verified the tag;
/// this is for display (`status`) and for carrying `created_at` forward.
pub fn peek_header(data: &[u8]) -> Result<VaultHeader> {
    parse_header(data).map(|(header, _)| header)
}

/// Parse the prefix and header.  Returns the header and the offset at which
/// the ciphertext starts (which is also the associated-data length).
fn parse_header(data: &[u8]) -> Result<(VaultHeader, usize)> {
    if data.len() < PREFIX_LEN + TAG_LEN {
        tracing::debug!(len = data.len(), "vault file too small");
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    if &data[0..4] != MAGIC {
        tracing::debug!("vault file is missing WPSV magic bytes");
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        tracing::debug!(version, "unsupported vault format version");
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&data[5..9]);
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    if header_len > MAX_HEADER_LEN {
        tracing::debug!(header_len, "vault header length out of range");
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    let header_end = PREFIX_LEN + header_len;
    if header_end + TAG_LEN > data.len() {
        tracing::debug!(header_len, "vault header length exceeds file size");
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    let header: VaultHeader = serde_json::from_slice(&data[PREFIX_LEN..header_end])
        .map_err(|e| {
            tracing::debug!(error = %e, "vault header is not valid JSON");
            WpStackError::WrongPinOrCorrupt
        })?;

    if header.version != version || !header.kdf.is_plausible() {
        tracing::debug!(kdf = ?header.kdf, "vault header fields out of range");
        return Err(WpStackError::WrongPinOrCorrupt);
    }

    Ok((header, header_end))
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
