//! `wpstack change-pin`: re-encrypt the vault under a new PIN.
//!
//! The vault is unlocked with the current PIN, then rewritten with a fresh
//! salt and nonce under the new one through the same backup-and-rename
//! protocol as every other write.

use crate::cli::output;
use crate::cli::{prompt_new_pin, Cli, Context, NEW_PIN_ENV};
use crate::errors::Result;

/// Execute the `change-pin` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;

    output::info("Enter your current vault PIN.");
    let (store, old_pin) = ctx.unlock()?;
    let count = store.len();
    drop(store);

    output::info("Choose your new vault PIN.");
    let new_pin = prompt_new_pin(NEW_PIN_ENV, ctx.settings.min_pin_length)?;

    ctx.vault.change_pin(&old_pin, &new_pin)?;

    output::success(&format!(
        "PIN changed ({count} credentials re-encrypted)"
    ));
    Ok(())
}
