//! `wpstack init`: choose a PIN and create an empty vault.

use crate::cli::output;
use crate::cli::{prompt_new_pin, Cli, Context, PIN_ENV};
use crate::credentials::KNOWN_CREDENTIALS;
use crate::errors::{WpStackError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;

    // Refuse before prompting if a vault already exists.
    if ctx.vault.exists() {
        output::tip("Use `wpstack set <NAME>` to add credentials to the existing vault.");
        return Err(WpStackError::VaultAlreadyExists(ctx.vault.path().to_path_buf()));
    }

    let pin = prompt_new_pin(PIN_ENV, ctx.settings.min_pin_length)?;
    ctx.vault.initialize(&pin)?;

    output::success(&format!("Vault created at {}", ctx.vault.path().display()));
    output::tip(&format!(
        "Keep {} out of version control.",
        ctx.vault_dir().display()
    ));
    for cred in KNOWN_CREDENTIALS.iter().filter(|c| c.required) {
        output::tip(&format!("wpstack set {}   # {}", cred.name, cred.description));
    }

    Ok(())
}
