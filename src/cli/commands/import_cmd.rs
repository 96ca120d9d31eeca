//! `passvault import`: replace the vault contents from an export file.

use std::fs;
use std::path::Path;

use dialoguer::Confirm;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Execute the `import` command.
pub async fn execute(cli: &Cli, file_path: &Path, force: bool) -> Result<()> {
    if !file_path.exists() {
        return Err(VaultError::CommandFailed(format!(
            "import file not found: {}",
            file_path.display()
        )));
    }

    // Validate before touching the vault.
    let contents = Zeroizing::new(fs::read(file_path)?);
    let vault = Vault::from_json(&contents)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Replace the vault contents with {} item(s) from {}?",
                vault.items.len(),
                file_path.display()
            ))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let count = vault.items.len();
    let engine = open_engine(cli).await?;
    let imported = engine.import(vault).await;
    engine.lock().await?;
    imported?;

    output::success(&format!(
        "Imported {count} item(s) from {}",
        file_path.display()
    ));
    Ok(())
}
