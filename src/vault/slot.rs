//! Exclusive, rollback-on-drop access to the live vault file.
//!
//! A write goes through three sibling paths in the vault directory:
//!
//! ```text
//! secrets.vault          live file, always a complete sealed image
//! secrets.vault.backup   copy of the previous live file while a write runs
//! .secrets.vault.tmp     new sealed image before it is renamed into place
//! ```
//!
//! [`LiveSlot`] owns those paths for the duration of one write.  Dropping it
//! without a successful [`LiveSlot::commit`] removes the temporary file and,
//! if the live path was already replaced, puts the backup back.  [`recover`]
//! cleans up after a process that died before its slot could do either.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{WpStackError, Result};

use super::format;

/// The backup sibling of a live vault path.
pub fn backup_path(live: &Path) -> PathBuf {
    let mut name = live.file_name().unwrap_or_default().to_os_string();
    name.push(".backup");
    live.with_file_name(name)
}

/// The temporary sibling of a live vault path.
pub fn temp_path(live: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(live.file_name().unwrap_or_default());
    name.push(".tmp");
    live.with_file_name(name)
}

/// Scoped ownership of the live vault file and its transient siblings.
pub struct LiveSlot {
    live: PathBuf,
    backup: PathBuf,
    temp: PathBuf,
    backed_up: bool,
    live_replaced: bool,
    committed: bool,
}

impl LiveSlot {
    /// Take the slot: copy the current live file (if any) to the backup path.
    pub fn acquire(live: &Path) -> Result<Self> {
        let mut slot = Self {
            live: live.to_path_buf(),
            backup: backup_path(live),
            temp: temp_path(live),
            backed_up: false,
            live_replaced: false,
            committed: false,
        };

        if live.exists() {
            let bytes = fs::read(live).map_err(WpStackError::io(live))?;
            // Marked before writing so a half-written backup is removed when
            // this slot drops.
            slot.backed_up = true;
            write_private(&slot.backup, &bytes)?;
            tracing::debug!(backup = %slot.backup.display(), "backed up live vault");
        }

        Ok(slot)
    }

    /// Write the new sealed image to the temporary path and flush it to disk.
    pub fn stage(&mut self, sealed: &[u8]) -> Result<()> {
        write_private(&self.temp, sealed)
    }

    /// Rename the staged image over the live path, then drop the backup.
    ///
    /// The rename is the single step that changes what the live path holds.
    /// After it, the live file is read back and compared with what was
    /// staged; a mismatch or read error puts the backup back in place.
    pub fn commit(mut self, sealed: &[u8]) -> Result<()> {
        fs::rename(&self.temp, &self.live).map_err(WpStackError::io(&self.live))?;
        self.live_replaced = true;
        sync_parent_dir(&self.live);

        let on_disk = fs::read(&self.live).map_err(WpStackError::io(&self.live))?;
        if on_disk != sealed {
            return Err(WpStackError::Io {
                path: self.live.clone(),
                source: std::io::Error::other("vault file did not read back as written"),
            });
        }

        self.committed = true;
        if self.backed_up {
            if let Err(e) = fs::remove_file(&self.backup) {
                // The live file is already authoritative; `recover` removes
                // a stale backup next time.
                tracing::warn!(backup = %self.backup.display(), error = %e, "could not remove vault backup");
            }
        }
        Ok(())
    }

    fn rollback(&mut self) {
        if self.temp.exists() {
            if let Err(e) = fs::remove_file(&self.temp) {
                tracing::warn!(temp = %self.temp.display(), error = %e, "could not remove staged vault file");
            }
        }

        if self.backed_up {
            if self.live_replaced {
                match fs::rename(&self.backup, &self.live) {
                    Ok(()) => {
                        sync_parent_dir(&self.live);
                        tracing::info!(live = %self.live.display(), "restored vault from backup");
                    }
                    Err(e) => {
                        tracing::error!(backup = %self.backup.display(), error = %e, "could not restore vault backup");
                    }
                }
            } else if let Err(e) = fs::remove_file(&self.backup) {
                tracing::warn!(backup = %self.backup.display(), error = %e, "could not remove vault backup");
            }
        } else if self.live_replaced {
            // There was no previous vault, so "as it was before" means absent.
            if let Err(e) = fs::remove_file(&self.live) {
                tracing::warn!(live = %self.live.display(), error = %e, "could not remove unverified vault file");
            }
        }
    }
}

impl Drop for LiveSlot {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

/// What [`recover`] found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recovery {
    pub removed_temp: bool,
    pub removed_stale_backup: bool,
    pub restored_backup: bool,
}

impl Recovery {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Clean up the leftovers of a write that never finished.
///
/// - A staged temp file is never authoritative and is removed.
/// - A backup with no live file, or with a live file that is not a
///   well-formed vault image, is moved back into place.
/// - A live file that cannot be read at all is an `Io` error and nothing
///   is moved.
/// - A backup next to a well-formed live file is stale (the rename already
///   happened) and is removed.
pub fn recover(live: &Path) -> Result<Recovery> {
    let backup = backup_path(live);
    let temp = temp_path(live);
    let mut report = Recovery::default();

    if temp.exists() {
        fs::remove_file(&temp).map_err(WpStackError::io(&temp))?;
        report.removed_temp = true;
        tracing::info!(temp = %temp.display(), "removed leftover staged vault file");
    }

    if backup.exists() {
        let live_ok = match fs::read(live) {
            Ok(bytes) => format::peek_header(&bytes).is_ok(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            // Unreadable is not the same as damaged; leave both files alone.
            Err(e) => return Err(WpStackError::Io {
                path: live.to_path_buf(),
                source: e,
            }),
        };

        if live_ok {
            fs::remove_file(&backup).map_err(WpStackError::io(&backup))?;
            report.removed_stale_backup = true;
            tracing::info!(backup = %backup.display(), "removed stale vault backup");
        } else {
            fs::rename(&backup, live).map_err(WpStackError::io(live))?;
            sync_parent_dir(live);
            report.restored_backup = true;
            tracing::warn!(live = %live.display(), "restored vault from backup left by an unfinished write");
        }
    }

    Ok(report)
}

/// Write `bytes` to `path` (owner-only on Unix) and flush to disk.
fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(WpStackError::io(path))?;
    file.write_all(bytes).map_err(WpStackError::io(path))?;
    file.sync_all().map_err(WpStackError::io(path))?;
    Ok(())
}

/// Best-effort fsync of the directory holding `path`, so a rename survives
/// a power loss.  Not supported on every platform; failures are ignored.
fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
