//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::storage::FileStorage;
use crate::vault::{VaultEngine, VaultItem};

/// Minimum password length to prevent trivially weak master passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// PassVault CLI: local encrypted password vault.
#[derive(Parser)]
#[command(name = "passvault", about = "Local encrypted password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory holding `.passvault.toml` and the vault file
    #[arg(short, long, default_value = ".", global = true)]
    pub dir: PathBuf,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Init,

    /// Add a credential
    Add {
        /// Display name (e.g. GitHub)
        name: String,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Generate a random password instead of prompting
        #[arg(short, long)]
        generate: bool,
        /// Length of the generated password
        #[arg(long, default_value_t = crate::crypto::password::DEFAULT_LENGTH)]
        length: usize,
    },

    /// Print a credential's password
    Get {
        /// Item id or exact name
        item: String,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
    },

    /// List all credentials
    List,

    /// Search credentials by name, username, url, notes or tag
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Change fields of a credential
    Update {
        /// Item id or exact name
        item: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Replace all tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
        /// Replace the password with a generated one
        #[arg(short, long, conflicts_with = "password")]
        generate: bool,
    },

    /// Delete a credential
    Delete {
        /// Item id or exact name
        item: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password (no vault needed)
    Generate {
        #[arg(short, long, default_value_t = crate::crypto::password::DEFAULT_LENGTH)]
        length: usize,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_symbols: bool,
    },

    /// Export the decrypted vault as JSON
    Export {
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the vault contents with a previously exported JSON file
    Import {
        /// Path to the exported JSON
        file: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `PASSVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        if pw.chars().count() < MIN_PASSWORD_LEN {
            return Err(VaultError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose master password")
                .with_confirmation(
                    "Confirm master password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}

/// Prompt for an item password (not the master password).
pub fn prompt_item_password() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Item password")
        .with_confirmation("Confirm item password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Load settings and build a file-backed engine for the project directory.
pub fn build_engine(cli: &Cli) -> Result<(VaultEngine, FileStorage)> {
    let settings = Settings::load(&cli.dir)?;
    let storage = FileStorage::new(settings.vault_path(&cli.dir));
    let engine = VaultEngine::with_storage(settings.engine_config(), Arc::new(storage.clone()));
    Ok((engine, storage))
}

/// Build the engine and unlock the existing vault.
pub async fn open_engine(cli: &Cli) -> Result<VaultEngine> {
    let (engine, storage) = build_engine(cli)?;
    if !storage.exists() {
        output::tip("Run `passvault init` to create a vault.");
        return Err(VaultError::Storage(format!(
            "no vault found at {}",
            storage.path().display()
        )));
    }

    let password = prompt_password()?;
    engine.unlock_from_storage(&password).await?;
    Ok(engine)
}

/// Resolve an item by id, or by case-insensitive exact name when the name
/// is unique.
pub async fn resolve_item(engine: &VaultEngine, key: &str) -> Result<VaultItem> {
    if let Some(item) = engine.get_item(key).await? {
        return Ok(item);
    }

    let mut matches: Vec<VaultItem> = engine
        .get_all_items()
        .await?
        .into_iter()
        .filter(|item| item.name.eq_ignore_ascii_case(key))
        .collect();

    match matches.len() {
        0 => Err(VaultError::CommandFailed(format!("no item named '{key}'"))),
        1 => Ok(matches.remove(0)),
        n => Err(VaultError::CommandFailed(format!(
            "{n} items are named '{key}', use the item id instead"
        ))),
    }
}
