//! `passvault init`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{build_engine, prompt_new_password, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `init` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let (engine, storage) = build_engine(cli)?;

    // 1. Refuse to overwrite an existing vault.
    if storage.exists() {
        output::tip("Use `passvault add` to add items to the existing vault.");
        return Err(VaultError::Storage(format!(
            "vault already exists at {}",
            storage.path().display()
        )));
    }

    // 2. Prompt for a new password (with confirmation).
    let password = prompt_new_password()?;

    // 3. Unlocking without a blob creates the vault; locking persists it.
    engine.unlock(&password, None).await?;
    engine.lock().await?;

    output::success(&format!("Vault created at {}", storage.path().display()));
    output::tip("Run `passvault add <NAME>` to store your first credential.");
    Ok(())
}
