//! Command line for Vaultkeeper: character builds and combat sessions.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::character::CharacterCommand;
use commands::data::DataCommand;
use commands::perks::PerksCommand;
use commands::session::SessionCommand;

#[derive(Parser)]
#[command(
    name = "vk",
    about = "Vaultkeeper — character builds and combat tracking for the wasteland",
    version,
    propagate_version = true
)]
struct Cli {
    /// Store file (overrides `store_path` from the config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Config file
    #[arg(short, long, global = true, default_value = "vault.toml")]
    config: PathBuf,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, edit and inspect characters
    Character {
        #[command(subcommand)]
        command: CharacterCommand,
    },

    /// Browse perks and check eligibility
    Perks {
        #[command(subcommand)]
        command: PerksCommand,
    },

    /// Run combat sessions
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Inspect the reference data in use
    Data {
        #[command(subcommand)]
        command: DataCommand,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::open(&cli.config, cli.store.as_deref()).and_then(|mut vault| {
        match cli.command {
            Commands::Character { command } => commands::character::run(&mut vault, command),
            Commands::Perks { command } => commands::perks::run(&vault, command),
            Commands::Session { command } => commands::session::run(&mut vault, command),
            Commands::Data { command } => commands::data::run(&vault, command),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
