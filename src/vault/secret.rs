//! The logical contents of a vault: a name -> value map of secrets.
//!
//! `SecretStore` is backed by a `BTreeMap` so its JSON serialization is
//! key-sorted and therefore canonical.  Values are wiped when the store is
//! dropped, and `Debug` only ever prints names.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{WpStackError, Result};

/// Maximum length of a secret name in bytes.
const MAX_NAME_LEN: usize = 256;

/// A set of named secrets held in memory.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretStore {
    entries: BTreeMap<String, String>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret, returning `true` if the value changed.
    ///
    /// Any previous value under `name` is wiped before it is dropped.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<bool> {
        validate_secret_name(name)?;
        match self.entries.get_mut(name) {
            Some(existing) if existing == value => Ok(false),
            Some(existing) => {
                existing.zeroize();
                existing.push_str(value);
                Ok(true)
            }
            None => {
                self.entries.insert(name.to_string(), value.to_string());
                Ok(true)
            }
        }
    }

    /// Remove a secret.  Returns `false` if it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.entries.remove(name) {
            Some(mut value) => {
                value.zeroize();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Secret names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the canonical plaintext form (key-sorted JSON object).
    pub fn to_plaintext(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| WpStackError::Serialization(format!("secret store: {e}")))
    }

    /// Parse the canonical plaintext form.
    ///
    /// Only called on bytes that already passed the AEAD check, so a parse
    /// failure still means the file is not something we wrote.
    pub fn from_plaintext(bytes: &[u8]) -> Result<Self> {
        let store: SecretStore =
            serde_json::from_slice(bytes).map_err(|_| WpStackError::WrongPinOrCorrupt)?;
        if store.names().any(|n| validate_secret_name(n).is_err()) {
            return Err(WpStackError::WrongPinOrCorrupt);
        }
        Ok(store)
    }
}

impl Drop for SecretStore {
    fn drop(&mut self) {
        for value in self.entries.values_mut() {
            value.zeroize();
        }
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Validate that a secret name is safe.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty and at most 256 characters.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(WpStackError::InvalidSecretName(
            "secret name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(WpStackError::InvalidSecretName(format!(
            "secret name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(WpStackError::InvalidSecretName(format!(
            "'{name}' contains invalid characters — only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}
