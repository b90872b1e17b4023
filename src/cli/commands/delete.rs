//! `wpstack delete`: remove a credential from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::{WpStackError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    crate::vault::validate_secret_name(name)?;
    let ctx = Context::load(cli)?;

    // Unlock first so a missing name is reported before asking to confirm.
    let (store, pin) = ctx.unlock()?;
    if !store.contains(name) {
        return Err(WpStackError::SecretNotFound(name.to_string()));
    }
    drop(store);

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete credential '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| WpStackError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    ctx.vault.remove(name, &pin)?;
    output::success(&format!("Deleted credential '{name}'"));

    Ok(())
}
