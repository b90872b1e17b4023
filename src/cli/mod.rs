//! CLI module: Clap argument parser, PIN prompts, output helpers, and
//! command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{WpStackError, Result};
use crate::vault::{unlock_with_retry, SecretStore, Vault};

/// Environment variable holding the vault PIN for scripted use.
pub const PIN_ENV: &str = "WPSTACK_PIN";

/// Environment variable holding the new PIN for scripted `change-pin`.
pub const NEW_PIN_ENV: &str = "WPSTACK_NEW_PIN";

/// Environment variable that stands in for `--vault-dir`.
pub const VAULT_DIR_ENV: &str = "WPSTACK_VAULT_DIR";

/// wpstack: credential vault for the WordPress deployment CLI.
#[derive(Parser)]
#[command(
    name = "wpstack",
    about = "PIN-encrypted credential vault for WordPress deployments",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: .wpstack, or `vault_dir` in .wpstack.toml)
    #[arg(long, global = true, env = VAULT_DIR_ENV)]
    pub vault_dir: Option<String>,

    /// Print diagnostic logs to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Choose a PIN and create an empty vault
    Init,

    /// Store a credential (add or replace)
    Set {
        /// Credential name (e.g. CLOUDFLARE_API_TOKEN)
        name: String,
        /// Credential value (omit for interactive prompt or stdin)
        value: Option<String>,
    },

    /// Print a credential's value
    Get {
        /// Credential name
        name: String,
    },

    /// List stored credential names
    List,

    /// Delete a credential
    Delete {
        /// Credential name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print all credentials to stdout
    Export {
        /// Output format: env (default) or json
        #[arg(short, long, default_value = "env")]
        format: String,
    },

    /// Change the vault PIN
    ChangePin,

    /// Show vault location and which deployment credentials are missing
    Status,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Everything a command needs: settings and the vault handle.
pub struct Context {
    pub settings: Settings,
    pub vault: Vault,
}

impl Context {
    /// Load `.wpstack.toml` from the working directory and open the vault.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(WpStackError::io(std::path::Path::new(".")))?;
        let settings = Settings::load(&cwd)?;
        let dir = match &cli.vault_dir {
            Some(dir) => cwd.join(dir),
            None => settings.vault_dir(&cwd),
        };
        let vault = Vault::open(&dir, settings.kdf_params())?;
        Ok(Self { settings, vault })
    }

    /// Path of the vault directory in use.
    pub fn vault_dir(&self) -> PathBuf {
        self.vault.dir().to_path_buf()
    }

    /// Unlock the vault, asking for the PIN up to `max_pin_attempts` times.
    ///
    /// A PIN from `WPSTACK_PIN` gets exactly one attempt; there is nobody
    /// to re-prompt in a script.
    pub fn unlock(&self) -> Result<(SecretStore, Zeroizing<String>)> {
        if !self.vault.exists() {
            return Err(WpStackError::VaultNotFound(self.vault.path().to_path_buf()));
        }

        if let Some(pin) = pin_from_env(PIN_ENV) {
            let store = self.vault.unlock(&pin)?;
            return Ok((store, pin));
        }

        let max = self.settings.max_pin_attempts;
        unlock_with_retry(&self.vault, max, |attempt| {
            if attempt > 1 {
                output::warning(&format!(
                    "Wrong PIN or corrupted vault (attempt {} of {max})",
                    attempt - 1
                ));
            }
            prompt_pin("Enter vault PIN")
        })
    }

    /// Get the PIN for a write.  An existing vault is verified first (with
    /// the usual retries); with no vault yet a new PIN is chosen.
    pub fn pin_for_write(&self) -> Result<Zeroizing<String>> {
        if self.vault.exists() {
            self.unlock().map(|(_, pin)| pin)
        } else {
            output::info("No vault yet — choose a PIN to create one.");
            prompt_new_pin(PIN_ENV, self.settings.min_pin_length)
        }
    }
}

/// Read a non-empty PIN from an environment variable.
fn pin_from_env(var: &str) -> Option<Zeroizing<String>> {
    match std::env::var(var) {
        Ok(pin) if !pin.is_empty() => Some(Zeroizing::new(pin)),
        _ => None,
    }
}

/// Interactive hidden PIN prompt.
///
/// Returns `Zeroizing<String>` so the PIN is wiped from memory on drop.
pub fn prompt_pin(prompt: &str) -> Result<Zeroizing<String>> {
    let pin = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| WpStackError::CommandFailed(format!("PIN prompt: {e}")))?;
    Ok(Zeroizing::new(pin))
}

/// Prompt for a new PIN with confirmation.
///
/// Also respects `env_var` (`WPSTACK_PIN` or `WPSTACK_NEW_PIN`) for
/// scripted/CI usage.  Enforces the minimum PIN length.
pub fn prompt_new_pin(env_var: &str, min_len: usize) -> Result<Zeroizing<String>> {
    if let Some(pin) = pin_from_env(env_var) {
        check_pin_length(&pin, min_len)?;
        return Ok(pin);
    }

    loop {
        let pin = dialoguer::Password::new()
            .with_prompt("Choose vault PIN")
            .with_confirmation("Confirm vault PIN", "PINs do not match, try again")
            .interact()
            .map_err(|e| WpStackError::CommandFailed(format!("PIN prompt: {e}")))?;
        let pin = Zeroizing::new(pin);

        if check_pin_length(&pin, min_len).is_err() {
            output::warning(&format!(
                "PIN must be at least {min_len} characters. Try again."
            ));
            continue;
        }

        return Ok(pin);
    }
}

/// Reject PINs shorter than `min_len` characters.
pub fn check_pin_length(pin: &str, min_len: usize) -> Result<()> {
    if pin.chars().count() < min_len {
        return Err(WpStackError::PinTooShort(min_len));
    }
    Ok(())
}
