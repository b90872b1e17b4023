//! High-level vault operations used by CLI commands.
//!
//! `Vault` owns the vault directory and the KDF parameters used for new
//! writes.  It never holds a PIN or a derived key between calls: every
//! operation takes the PIN, derives what it needs, and lets it drop.

use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto::KdfParams;
use crate::errors::{WpStackError, Result};
use crate::signal::{self, CriticalSection};

use super::format::{self, VaultHeader};
use super::secret::{validate_secret_name, SecretStore};
use super::slot::{self, LiveSlot, Recovery};

/// File name of the live vault inside the vault directory.
pub const VAULT_FILE_NAME: &str = "secrets.vault";

/// Handle on the encrypted vault in one directory.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Directory that holds the vault and its transient siblings.
    dir: PathBuf,

    /// `<dir>/secrets.vault`.
    path: PathBuf,

    /// Argon2id params for files this handle writes.  Reads always use the
    /// params recorded in the file header.
    params: KdfParams,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault in `dir` and clean up after any write that was cut
    /// short.  The directory itself is only created by the first write.
    pub fn open(dir: &Path, params: KdfParams) -> Result<Self> {
        let vault = Self {
            dir: dir.to_path_buf(),
            path: dir.join(VAULT_FILE_NAME),
            params,
        };

        let report = vault.recover()?;
        if !report.is_clean() {
            tracing::info!(?report, "recovered vault directory");
        }

        Ok(vault)
    }

    /// Run crash recovery on the vault directory.
    pub fn recover(&self) -> Result<Recovery> {
        slot::recover(&self.path)
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Returns `true` if a vault file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Decrypt the live vault.
    ///
    /// `VaultNotFound` if no vault has been created yet, `WrongPinOrCorrupt`
    /// if the PIN is wrong or the file is damaged.  Never writes.
    pub fn unlock(&self, pin: &str) -> Result<SecretStore> {
        self.read(pin).map(|(_, store)| store)
    }

    /// Decrypt and return every secret, for callers that validate or
    /// reconcile the full set elsewhere.  Never writes.
    pub fn export_all(&self, pin: &str) -> Result<SecretStore> {
        self.unlock(pin)
    }

    /// Read the header without a PIN.  Nothing in it is authenticated.
    pub fn header(&self) -> Result<VaultHeader> {
        let data = self.read_bytes()?;
        format::peek_header(&data)
    }

    fn read(&self, pin: &str) -> Result<(VaultHeader, SecretStore)> {
        let data = self.read_bytes()?;
        let opened = format::open(&data, pin.as_bytes());
        if opened.is_err() {
            tracing::debug!(path = %self.path.display(), "vault failed to decrypt");
        }
        opened
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(WpStackError::VaultNotFound(self.path.clone()))
            }
            Err(e) => Err(WpStackError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Create an empty vault protected by `pin`.
    pub fn initialize(&self, pin: &str) -> Result<()> {
        if self.exists() {
            return Err(WpStackError::VaultAlreadyExists(self.path.clone()));
        }
        self.write(pin, |_| Ok(true))?;
        tracing::info!(path = %self.path.display(), "created vault");
        Ok(())
    }

    /// Store `value` under `name`, replacing any previous value.
    ///
    /// If a vault exists it must decrypt under `pin` first; otherwise
    /// nothing is written.  Creates the vault if there is none yet.
    pub fn store(&self, name: &str, value: &str, pin: &str) -> Result<()> {
        validate_secret_name(name)?;
        self.write(pin, |secrets| secrets.insert(name, value))?;
        tracing::info!(secret = name, "stored secret");
        Ok(())
    }

    /// Remove the secret `name`.  `SecretNotFound` (and no write) if absent.
    pub fn remove(&self, name: &str, pin: &str) -> Result<()> {
        validate_secret_name(name)?;
        let existing = self.read_existing(pin)?;
        if !existing.as_ref().is_some_and(|(_, s)| s.contains(name)) {
            return Err(WpStackError::SecretNotFound(name.to_string()));
        }
        self.write_from(existing, pin, |secrets| Ok(secrets.remove(name)))?;
        tracing::info!(secret = name, "removed secret");
        Ok(())
    }

    /// Re-encrypt the vault under a new PIN.
    pub fn change_pin(&self, old_pin: &str, new_pin: &str) -> Result<()> {
        let (header, secrets) = self.read(old_pin)?;
        self.write_from(Some((header, secrets)), new_pin, |_| Ok(true))?;
        tracing::info!(path = %self.path.display(), "changed vault PIN");
        Ok(())
    }

    /// Read-merge-write under a single PIN.
    fn write<F>(&self, pin: &str, merge: F) -> Result<()>
    where
        F: FnOnce(&mut SecretStore) -> Result<bool>,
    {
        let existing = self.read_existing(pin)?;
        self.write_from(existing, pin, merge)
    }

    /// Decrypt the current file if there is one.  A file that will not open
    /// under `pin` aborts the write before anything is touched.
    fn read_existing(&self, pin: &str) -> Result<Option<(VaultHeader, SecretStore)>> {
        match self.read(pin) {
            Ok(opened) => Ok(Some(opened)),
            Err(WpStackError::VaultNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The write protocol: merge, back up, seal, stage, rename, clean up.
    ///
    /// `merge` returns whether it changed anything; an unchanged store over
    /// an existing file is not rewritten.  Any error or interrupt before the
    /// commit drops the slot, which removes the staged file and the backup
    /// and leaves the live file as it was.
    fn write_from<F>(
        &self,
        existing: Option<(VaultHeader, SecretStore)>,
        pin: &str,
        merge: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut SecretStore) -> Result<bool>,
    {
        self.write_steps(existing, pin, merge, |_| signal::checkpoint())
    }

    /// [`Self::write_from`] with the check run between steps passed in.
    fn write_steps<F, C>(
        &self,
        existing: Option<(VaultHeader, SecretStore)>,
        pin: &str,
        merge: F,
        mut checkpoint: C,
    ) -> Result<()>
    where
        F: FnOnce(&mut SecretStore) -> Result<bool>,
        C: FnMut(WriteStep) -> Result<()>,
    {
        let _critical = CriticalSection::enter();
        checkpoint(WriteStep::Start)?;

        // Never write a file that `unlock` would refuse to open.
        self.params.check_bounds()?;

        let had_file = existing.is_some();
        let (created_at, mut secrets) = match existing {
            Some((header, secrets)) => (Some(header.created_at), secrets),
            None => (None, SecretStore::new()),
        };

        if !merge(&mut secrets)? && had_file {
            tracing::debug!("vault contents unchanged, skipping write");
            return Ok(());
        }

        if !self.dir.exists() {
            create_private_dir(&self.dir)?;
            tracing::debug!(dir = %self.dir.display(), "created vault directory");
        }

        let mut slot = LiveSlot::acquire(&self.path)?;
        checkpoint(WriteStep::BackedUp)?;

        let sealed = format::seal(&secrets, pin.as_bytes(), &self.params, created_at)?;
        checkpoint(WriteStep::Sealed)?;

        slot.stage(&sealed)?;
        checkpoint(WriteStep::Staged)?;

        slot.commit(&sealed)?;
        tracing::debug!(
            path = %self.path.display(),
            secrets = secrets.len(),
            "vault written"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the vault directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the KDF params used for new writes.
    pub fn params(&self) -> &KdfParams {
        &self.params
    }
}

/// Points in a write where an interrupt is checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteStep {
    Start,
    BackedUp,
    Sealed,
    Staged,
}

/// Create the vault directory with owner-only permissions on Unix.
fn create_private_dir(dir: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)
            .map_err(WpStackError::io(dir))
    }

    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir).map_err(WpStackError::io(dir))
    }
}
