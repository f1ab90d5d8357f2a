//! Roll on Tablator tables, list them, or print them as plain text.

mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tablator_cli::{Config, logging};
use tablator_core::{Generator, TableStore};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "tablator",
    about = "Roll on weighted random tables",
    version
)]
struct Cli {
    /// Directory containing the table files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Config file (default: ~/.config/tablator/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List available tables
    #[arg(short, long)]
    list: bool,

    /// Number of rolls on each table
    #[arg(short, long, default_value = "1")]
    number: usize,

    /// Print the tables as plain text instead of rolling
    #[arg(short, long)]
    print: bool,

    /// RNG seed for reproducible rolls
    #[arg(short, long)]
    seed: Option<u64>,

    /// Enable debug messages
    #[arg(short, long)]
    verbose: bool,

    /// Enable trace messages
    #[arg(short, long)]
    trace: bool,

    /// Table names
    tables: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let env = |key: &str| std::env::var(key).ok();
    let config = Config::load(cli.config.as_deref(), &env)?
        .with_env(&env)?
        .with_flags(cli.verbose, cli.trace)
        .with_data_dir(cli.data_dir);
    logging::init(config.verbose, config.trace);
    if let Some(path) = &config.source {
        debug!(path = %path.display(), "read config");
    }

    let store = TableStore::open(config.resolve_data_dir(&env)).map_err(|e| e.to_string())?;
    let mut generator = match cli.seed {
        Some(seed) => Generator::with_seed(store, seed),
        None => Generator::new(store),
    };

    if cli.list {
        return commands::list::run(generator.store_mut());
    }
    if cli.tables.is_empty() {
        return Err("no table names given (try --list)".into());
    }

    for table in &cli.tables {
        if cli.print {
            commands::print::run(&mut generator, table)?;
        } else {
            commands::roll::run(&mut generator, table, cli.number)?;
        }
    }

    Ok(())
}
