use clap::Parser;
use tracing_subscriber::EnvFilter;

use passvault::cli::commands;
use passvault::cli::{Cli, Commands};
use passvault::crypto::PasswordOptions;

/// Log to stderr so stdout stays clean for passwords and exports.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli).await,
        Commands::Add {
            ref name,
            ref username,
            ref url,
            ref notes,
            ref tags,
            generate,
            length,
        } => {
            let args = commands::add::AddArgs {
                name,
                username: username.as_deref(),
                url: url.as_deref(),
                notes: notes.as_deref(),
                tags,
                generate,
                length,
            };
            commands::add::execute(&cli, args).await
        }
        Commands::Get { ref item, copy } => commands::get::execute(&cli, item, copy).await,
        Commands::List => commands::list::execute(&cli).await,
        Commands::Search { ref query } => commands::search::execute(&cli, query).await,
        Commands::Update {
            ref item,
            ref name,
            ref username,
            ref url,
            ref notes,
            ref tags,
            password,
            generate,
        } => {
            let args = commands::update::UpdateArgs {
                item,
                name: name.as_deref(),
                username: username.as_deref(),
                url: url.as_deref(),
                notes: notes.as_deref(),
                tags,
                password,
                generate,
            };
            commands::update::execute(&cli, args).await
        }
        Commands::Delete { ref item, force } => {
            commands::delete::execute(&cli, item, force).await
        }
        Commands::Generate {
            length,
            no_lowercase,
            no_uppercase,
            no_digits,
            no_symbols,
        } => commands::generate::execute(&PasswordOptions {
            length,
            lowercase: !no_lowercase,
            uppercase: !no_uppercase,
            digits: !no_digits,
            symbols: !no_symbols,
        }),
        Commands::Export { ref output } => {
            commands::export::execute(&cli, output.as_deref()).await
        }
        Commands::Import { ref file, force } => {
            commands::import_cmd::execute(&cli, file, force).await
        }
    };

    if let Err(e) = result {
        passvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
