//! # Notes Reporter CLI (`notes`)
//!
//! ## Usage
//!
//! ```bash
//! notes --config ./config/notes.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `notes init` | Create the SQLite database and table |
//! | `notes reset` | Discard every stored entry (cold start) |
//! | `notes status` | Show how many entries are stored |
//! | `notes query` | Fetch once and print a report |
//! | `notes serve` | Start the HTTP report server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use notes_reporter::{config, logging, migrate, query, server};

/// Notes Reporter: reported phone numbers, live page first, SQLite history behind it.
#[derive(Parser)]
#[command(name = "notes", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/notes.toml")]
    config: PathBuf,

    /// Log at DEBUG instead of INFO.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite file and the `numbers` table. Safe to run twice.
    Init,

    /// Drop and recreate the `numbers` table.
    Reset,

    /// Print the number of stored entries.
    Status,

    /// Fetch the source page once, merge it, and print a report.
    Query {
        /// Number of results to show. Without it, the newest stored
        /// entries (default window) are shown.
        #[arg(long)]
        limit: Option<usize>,

        /// Only show numbers in this three-digit area code.
        #[arg(long)]
        area: Option<String>,
    },

    /// Start the HTTP report server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize_logging(cli.verbose)?;

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Reset => {
            query::run_reset(&cfg).await?;
        }
        Commands::Status => {
            query::run_status(&cfg).await?;
        }
        Commands::Query { limit, area } => {
            query::run_query(&cfg, limit, area).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
