//! `passvault delete`: remove a credential from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_engine, resolve_item, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub async fn execute(cli: &Cli, key: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete item '{key}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let engine = open_engine(cli).await?;
    let deleted = async {
        let item = resolve_item(&engine, key).await?;
        engine.delete_item(&item.id).await?;
        Ok::<_, VaultError>(item)
    }
    .await;
    engine.lock().await?;
    let item = deleted?;

    output::success(&format!("Deleted '{}'", item.name));
    Ok(())
}
