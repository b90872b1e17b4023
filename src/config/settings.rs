use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::errors::{WpStackError, Result};

/// Project-level configuration, loaded from `.wpstack.toml`.
///
/// Every field has a sensible default so wpstack works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) where the vault is stored.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// PIN attempts allowed before unlock gives up (default: 3).
    #[serde(default = "default_max_pin_attempts")]
    pub max_pin_attempts: u32,

    /// Shortest PIN accepted when choosing a new one (default: 4).
    #[serde(default = "default_min_pin_length")]
    pub min_pin_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".wpstack".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_max_pin_attempts() -> u32 {
    crate::vault::DEFAULT_MAX_ATTEMPTS
}

fn default_min_pin_length() -> usize {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            max_pin_attempts: default_max_pin_attempts(),
            min_pin_length: default_min_pin_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".wpstack.toml";

    /// Load settings from `<project_dir>/.wpstack.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(WpStackError::io(&config_path))?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            WpStackError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.max_pin_attempts == 0 {
            return Err(WpStackError::Config(
                "max_pin_attempts must be at least 1".into(),
            ));
        }

        // Reject Argon2 settings a later unlock would refuse to run.
        settings.kdf_params().check_bounds().map_err(|e| match e {
            WpStackError::Encryption(msg) => {
                WpStackError::Config(format!("{}: {msg}", config_path.display()))
            }
            other => other,
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Build the full path to the vault directory.
    ///
    /// Example: `project_dir/.wpstack`
    pub fn vault_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
