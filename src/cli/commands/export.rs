//! `passvault export`: write the decrypted vault as JSON.
//!
//! The output is plaintext.  It is meant for backups and migration by a
//! trusted user, and is written with a warning.

use std::fs;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `export` command.
pub async fn execute(cli: &Cli, output_path: Option<&std::path::Path>) -> Result<()> {
    let engine = open_engine(cli).await?;
    let exported = engine.export().await;
    engine.lock().await?;
    let vault = exported?;

    let json = Zeroizing::new(
        serde_json::to_string_pretty(&vault)
            .map_err(|e| VaultError::Serialization(format!("export: {e}")))?,
    );

    match output_path {
        Some(dest) => {
            fs::write(dest, json.as_bytes())?;
            output::success(&format!(
                "Exported {} item(s) to {}",
                vault.items.len(),
                dest.display()
            ));
            output::warning("This file contains plaintext passwords. Delete it when done.");
        }
        None => {
            println!("{}", json.as_str());
        }
    }

    Ok(())
}
