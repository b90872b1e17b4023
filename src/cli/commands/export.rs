//! `wpstack export`: print every credential to stdout.
//!
//! Supported formats:
//! - `env` (default): `.env` file format (NAME=value, one per line)
//! - `json`: JSON object { "NAME": "value", ... }
//!
//! Output always goes to stdout so nothing plaintext is written to disk by
//! wpstack itself.

use zeroize::Zeroizing;

use crate::cli::{Cli, Context};
use crate::errors::{WpStackError, Result};
use crate::vault::SecretStore;

/// Execute the `export` command.
pub fn execute(cli: &Cli, format: &str) -> Result<()> {
    // Reject a bad format before asking for the PIN.
    let format = ExportFormat::parse(format)?;

    let ctx = Context::load(cli)?;
    let (store, _pin) = ctx.unlock()?;

    let content = match format {
        ExportFormat::Env => format_as_env(&store),
        ExportFormat::Json => format_as_json(&store)?,
    };

    print!("{}", content.as_str());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Env,
    Json,
}

impl ExportFormat {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "env" => Ok(Self::Env),
            "json" => Ok(Self::Json),
            other => Err(WpStackError::CommandFailed(format!(
                "unknown export format '{other}' — use 'env' or 'json'"
            ))),
        }
    }
}

/// Format credentials as `.env` file content.
fn format_as_env(store: &SecretStore) -> Zeroizing<String> {
    use std::fmt::Write;
    let mut out = Zeroizing::new(String::new());
    for (name, value) in store.iter() {
        // Quote values that contain spaces, special chars, or are empty.
        if value.is_empty()
            || value.contains(' ')
            || value.contains('#')
            || value.contains('"')
            || value.contains('\'')
            || value.contains('\n')
            || value.contains('$')
        {
            let escaped = value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n");
            let _ = writeln!(out, "{name}=\"{escaped}\"");
        } else {
            let _ = writeln!(out, "{name}={value}");
        }
    }
    out
}

/// Format credentials as a JSON object.
fn format_as_json(store: &SecretStore) -> Result<Zeroizing<String>> {
    let mut json = serde_json::to_string_pretty(store)
        .map_err(|e| WpStackError::Serialization(format!("JSON export: {e}")))?;
    json.push('\n');
    Ok(Zeroizing::new(json))
}
