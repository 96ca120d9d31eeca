//! `passvault add`: store a new credential.

use crate::cli::output;
use crate::cli::{open_engine, prompt_item_password, Cli};
use crate::crypto::{generate_password, PasswordOptions};
use crate::errors::Result;
use crate::vault::NewItem;

/// Fields collected from the command line.
pub struct AddArgs<'a> {
    pub name: &'a str,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub tags: &'a [String],
    pub generate: bool,
    pub length: usize,
}

/// Execute the `add` command.
pub async fn execute(cli: &Cli, args: AddArgs<'_>) -> Result<()> {
    let password = if args.generate {
        generate_password(&PasswordOptions::with_length(args.length))?
    } else {
        prompt_item_password()?
    };

    let engine = open_engine(cli).await?;

    let mut fields = NewItem::new(args.name, password.as_str()).tags(args.tags.iter().cloned());
    fields.username = args.username.map(str::to_string);
    fields.url = args.url.map(str::to_string);
    fields.notes = args.notes.map(str::to_string);

    let added = engine.add_item(fields).await;
    // Persist whatever state we ended up in, even if the add failed.
    engine.lock().await?;
    let item = added?;

    output::success(&format!("Added '{}' ({})", item.name, item.id));
    if args.generate {
        output::tip("Run `passvault get <NAME>` to reveal the generated password.");
    }
    Ok(())
}
