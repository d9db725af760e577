//! oxide-schema CLI
//!
//! Command-line tool for checking live SQLite tables against expected
//! schema descriptions.

use std::path::PathBuf;

use anyhow::Context;
use clap::builder::{StringValueParser, TypedValueParser};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_schema::{CheckOptions, TableDescription};
use oxide_schema_sqlite::{disable_hint, is_disable_value, SqliteIntrospector, DISABLE_ENV_KEY};

/// Checks live database tables against their expected schema.
#[derive(Parser)]
#[command(name = "oxide-schema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a table against an expected description.
    Check {
        /// Table to check.
        #[arg(short, long)]
        table: String,

        /// JSON file holding the expected description.
        #[arg(short, long)]
        expected: PathBuf,

        /// Leave indexes out of the comparison.
        #[arg(long)]
        skip_indexes: bool,

        /// Skip the check entirely.
        #[arg(
            long,
            env = "DISABLE_SCHEMA_CHECK",
            action = ArgAction::SetTrue,
            value_parser = disable_parser()
        )]
        disable: bool,
    },

    /// Print a table's description in the expected-description format.
    Dump {
        /// Table to dump.
        #[arg(short, long)]
        table: String,

        /// Write to this file instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List user tables.
    Tables,
}

/// Reads `--disable` and `DISABLE_SCHEMA_CHECK` with the same rule as the
/// library's environment helpers.
fn disable_parser() -> impl TypedValueParser<Value = bool> {
    StringValueParser::new().map(|value| is_disable_value(&value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Check {
            table,
            expected,
            skip_indexes,
            disable,
        } => {
            if disable {
                info!("Schema check disabled by {}.", DISABLE_ENV_KEY);
                return Ok(());
            }

            let text = std::fs::read_to_string(&expected)
                .with_context(|| format!("Failed to read {}", expected.display()))?;
            let description: TableDescription = serde_json::from_str(&text)
                .with_context(|| format!("Invalid expected description in {}", expected.display()))?;

            let introspector = SqliteIntrospector::connect(&cli.database).await?;
            let options = CheckOptions::new().skip_indexes(skip_indexes);
            match introspector.check_table(&table, &description, options).await {
                Ok(()) => info!("Table {} matches {}.", table, expected.display()),
                Err(error) => match error.as_schema_diff() {
                    Some(diff) => anyhow::bail!("{diff}\n{}", disable_hint()),
                    None => return Err(error.into()),
                },
            }
        }

        Commands::Dump { table, output } => {
            let introspector = SqliteIntrospector::connect(&cli.database).await?;
            let dump = introspector.dump_table(&table).await?;
            let json = serde_json::to_string_pretty(&dump)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{json}\n"))?;
                    info!("Wrote {} to {}", table, path.display());
                }
                None => println!("{json}"),
            }
        }

        Commands::Tables => {
            let introspector = SqliteIntrospector::connect(&cli.database).await?;
            let tables = introspector.tables().await?;

            if tables.is_empty() {
                info!("No tables found.");
            } else {
                for table in &tables {
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}
