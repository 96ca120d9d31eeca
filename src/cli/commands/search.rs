//! `passvault search`: filter credentials by a substring.

use crate::cli::output;
use crate::cli::{open_engine, Cli};
use crate::errors::Result;

/// Execute the `search` command.
pub async fn execute(cli: &Cli, query: &str) -> Result<()> {
    let engine = open_engine(cli).await?;
    let items = engine.search_items(query).await;
    engine.lock().await?;
    let items = items?;

    output::info(&format!("{} match(es) for '{query}'", items.len()));
    output::print_items_table(&items);

    Ok(())
}
