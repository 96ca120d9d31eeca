//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::VaultItem;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of items (never their passwords).
pub fn print_items_table(items: &[VaultItem]) {
    if items.is_empty() {
        info("No items to show.");
        tip("Run `passvault add <NAME>` to add a credential.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Username", "URL", "Tags", "Updated", "ID"]);

    for item in items {
        table.add_row(vec![
            item.name.clone(),
            item.username.clone().unwrap_or_default(),
            item.url.clone().unwrap_or_default(),
            item.tags.join(", "),
            item.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            item.id.clone(),
        ]);
    }

    println!("{table}");
}
