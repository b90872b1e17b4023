//! `wpstack set`: add or replace a credential in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::credentials;
use crate::errors::{WpStackError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>) -> Result<()> {
    crate::vault::validate_secret_name(name)?;
    let ctx = Context::load(cli)?;

    // Determine the credential value from one of three sources.
    let secret_value = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line — it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| WpStackError::CommandFailed(format!("reading stdin: {e}")))?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        buf
    } else {
        // Source 3: Interactive secure prompt (default).
        let v = dialoguer::Password::new()
            .with_prompt(format!("Enter value for {name}"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| WpStackError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(v)
    };

    if secret_value.is_empty() {
        output::warning(&format!("Storing an empty value for '{name}'."));
    }

    let pin = ctx.pin_for_write()?;
    ctx.vault.store(name, &secret_value, &pin)?;

    output::success(&format!(
        "Credential '{name}' saved to {}",
        ctx.vault.path().display()
    ));
    if credentials::known(name).is_none() {
        output::tip("This name is not one the deployment flow reads; `wpstack status` lists the expected ones.");
    }

    Ok(())
}
