//! `passvault list`: display all credentials in a table.

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let engine = open_engine(cli).await?;
    let items = engine.get_all_items().await;
    engine.lock().await?;
    let items = items?;

    output::info(&format!("{} item(s)", items.len()));
    output::print_items_table(&items);

    Ok(())
}
