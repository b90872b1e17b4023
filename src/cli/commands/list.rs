//! `wpstack list`: show the names of stored credentials.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let (store, _pin) = ctx.unlock()?;

    output::print_secrets_table(&store);
    Ok(())
}
