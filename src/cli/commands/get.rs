//! `passvault get`: reveal a single credential's password.

use crate::cli::output;
use crate::cli::{open_engine, resolve_item, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub async fn execute(cli: &Cli, key: &str, copy: bool) -> Result<()> {
    let engine = open_engine(cli).await?;

    let found = async {
        let item = resolve_item(&engine, key).await?;
        engine.mark_used(&item.id).await?;
        Ok::<_, VaultError>(item)
    }
    .await;
    engine.lock().await?;
    let item = found?;

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_text(item.password.clone())
            .map_err(|e| VaultError::CommandFailed(format!("clipboard write failed: {e}")))?;
        output::success(&format!("Copied password for '{}' to the clipboard", item.name));
    } else {
        println!("{}", item.password);
    }

    Ok(())
}
