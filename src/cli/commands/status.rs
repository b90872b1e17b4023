//! `wpstack status`: vault location and credential coverage.

use console::style;

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::credentials::{self, CredentialValidator, PresenceValidator};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let path = ctx.vault.path();

    println!("Vault: {}", path.display());

    if !ctx.vault.exists() {
        output::info("No vault yet.");
        output::tip("Run `wpstack init` to choose a PIN and create one.");
        return Ok(());
    }

    // The header is readable without a PIN (unauthenticated, display only).
    if let Ok(header) = ctx.vault.header() {
        println!(
            "Created: {}   Updated: {}",
            header.created_at.format("%Y-%m-%d %H:%M:%S"),
            header.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    let (store, _pin) = ctx.unlock()?;
    println!("Credentials: {}", store.len());

    for cred in credentials::KNOWN_CREDENTIALS {
        let present = store.get(cred.name).is_some_and(|v| !v.is_empty());
        let mark = if present {
            style("\u{2713}").green()
        } else if cred.required {
            style("\u{2717}").red()
        } else {
            style("-").dim()
        };
        println!("  {mark} {:<24} {}", cred.name, cred.description);
    }

    if PresenceValidator.validate(&store) {
        output::success("All required deployment credentials are present.");
    } else {
        output::warning("Some required deployment credentials are missing.");
    }

    Ok(())
}
