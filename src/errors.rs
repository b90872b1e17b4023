use std::path::{Path, PathBuf};
use thiserror::Error;

/// All errors that can occur in wpstack.
#[derive(Debug, Error)]
pub enum WpStackError {
    // --- Crypto errors ---
    #[error("Wrong PIN or corrupted vault file")]
    WrongPinOrCorrupt,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    // --- Vault errors ---
    #[error("No vault found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error("Invalid secret name: {0}")]
    InvalidSecretName(String),

    #[error("Giving up after {0} failed PIN attempts")]
    TooManyAttempts(u32),

    #[error("PIN must be at least {0} characters")]
    PinTooShort(usize),

    #[error("Interrupted — vault left unchanged")]
    Interrupted,

    // --- IO errors ---
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl WpStackError {
    /// Build a closure that wraps an `io::Error` with the path it failed on.
    ///
    /// Meant for `map_err`: `fs::read(p).map_err(WpStackError::io(p))?`.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience type alias for wpstack results.
pub type Result<T> = std::result::Result<T, WpStackError>;
