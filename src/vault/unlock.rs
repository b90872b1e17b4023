//! Bounded PIN retry around [`Vault::unlock`].

use zeroize::Zeroizing;

use crate::errors::{WpStackError, Result};

use super::secret::SecretStore;
use super::store::Vault;

/// Default number of PIN attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Ask for a PIN up to `max_attempts` times until the vault opens.
///
/// `prompt` receives the 1-based attempt number and returns the PIN to try,
/// or an error to stop early (e.g. the user cancelled).  Only
/// `WrongPinOrCorrupt` is retried; every other error is returned at once.
/// Failed attempts never touch the file.
///
/// On success returns the decrypted store and the PIN that opened it, so the
/// caller can use it for a following write.
pub fn unlock_with_retry<F>(
    vault: &Vault,
    max_attempts: u32,
    mut prompt: F,
) -> Result<(SecretStore, Zeroizing<String>)>
where
    F: FnMut(u32) -> Result<Zeroizing<String>>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let pin = prompt(attempt)?;
        match vault.unlock(&pin) {
            Ok(store) => return Ok((store, pin)),
            Err(WpStackError::WrongPinOrCorrupt) => {
                tracing::debug!(attempt, max_attempts, "PIN attempt failed");
            }
            Err(e) => return Err(e),
        }
    }

    Err(WpStackError::TooManyAttempts(max_attempts))
}
