//! `wpstack get`: print a single credential's value.

use crate::cli::{Cli, Context};
use crate::errors::{WpStackError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let ctx = Context::load(cli)?;
    let (store, _pin) = ctx.unlock()?;

    // Print only the value to stdout so it can be captured by scripts.
    let value = store
        .get(name)
        .ok_or_else(|| WpStackError::SecretNotFound(name.to_string()))?;
    println!("{value}");

    Ok(())
}
