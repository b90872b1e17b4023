//! `wpstack completions`: print a shell completion script to stdout.
//!
//! ```text
//! wpstack completions bash > ~/.local/share/bash-completion/completions/wpstack
//! wpstack completions zsh > "${fpath[1]}/_wpstack"
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, &mut std::io::stdout());
    Ok(())
}
