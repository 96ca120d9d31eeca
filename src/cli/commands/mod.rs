//! One module per subcommand.

pub mod add;
pub mod delete;
pub mod export;
pub mod generate;
pub mod get;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod search;
pub mod update;
