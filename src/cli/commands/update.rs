//! `passvault update`: change fields of an existing credential.

use crate::cli::output;
use crate::cli::{open_engine, prompt_item_password, resolve_item, Cli};
use crate::crypto::{generate_password, PasswordOptions};
use crate::errors::{Result, VaultError};
use crate::vault::ItemUpdate;

/// Fields collected from the command line.
pub struct UpdateArgs<'a> {
    pub item: &'a str,
    pub name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub tags: &'a [String],
    pub password: bool,
    pub generate: bool,
}

/// Execute the `update` command.
pub async fn execute(cli: &Cli, args: UpdateArgs<'_>) -> Result<()> {
    let new_password = if args.generate {
        Some(generate_password(&PasswordOptions::default())?)
    } else if args.password {
        Some(prompt_item_password()?)
    } else {
        None
    };

    let update = ItemUpdate {
        name: args.name.map(str::to_string),
        username: args.username.map(str::to_string),
        password: new_password.as_ref().map(|pw| pw.as_str().to_owned()),
        url: args.url.map(str::to_string),
        notes: args.notes.map(str::to_string),
        tags: (!args.tags.is_empty()).then(|| args.tags.to_vec()),
        last_used: None,
    };

    if update == ItemUpdate::default() {
        output::warning("Nothing to update.");
        return Ok(());
    }

    let engine = open_engine(cli).await?;
    let updated = async {
        let item = resolve_item(&engine, args.item).await?;
        engine
            .update_item(&item.id, update)
            .await?
            .ok_or_else(|| VaultError::CommandFailed(format!("item '{}' vanished", item.id)))
    }
    .await;
    engine.lock().await?;
    let item = updated?;

    output::success(&format!("Updated '{}'", item.name));
    Ok(())
}
