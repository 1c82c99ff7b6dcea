//! pathdb CLI
//!
//! Command-line access to a pathdb JSON file.
//!
//! # Commands
//!
//! - `query` - Run a path query against a table
//! - `add` / `replace` / `remove` - Mutate a table
//! - `next-id` / `count` / `sum` / `average` - Table statistics
//! - `tables` - List table names
//! - `clean-logs` - Empty the error table and trim the log table

mod commands;

use clap::{Parser, Subcommand};
use pathdb_core::Database;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pathdb command-line tools.
#[derive(Parser)]
#[command(name = "pathdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    file: Option<PathBuf>,

    /// Re-read the file before every read
    #[arg(global = true, long)]
    no_cache: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Table(TableCommand),

    /// Show version information
    Version,
}

/// Commands that open the database file.
#[derive(Subcommand)]
enum TableCommand {
    /// Run a path query against a table
    Query {
        /// Table name
        table: String,

        /// Expression applied to the table, e.g. '.{.id > 1}'
        #[arg(default_value = ".")]
        expression: String,

        /// Print only the first match ('{}' if none)
        #[arg(short, long)]
        one: bool,
    },

    /// Append a JSON record (or an array of records) to a table
    Add {
        /// Table name
        table: String,

        /// Record as JSON
        record: String,

        /// Assign the next id to the record if it has none
        #[arg(long)]
        assign_id: bool,
    },

    /// Replace records by id, or by a filter expression
    Replace {
        /// Table name
        table: String,

        /// Replacement record as JSON
        record: String,

        /// Expression selecting the records to replace
        #[arg(long)]
        filter: Option<String>,
    },

    /// Remove the records matched by an expression
    Remove {
        /// Table name
        table: String,

        /// Expression selecting the records to remove
        expression: String,
    },

    /// Print the next free id of a table
    NextId {
        /// Table name
        table: String,
    },

    /// Print the number of records in a table
    Count {
        /// Table name
        table: String,
    },

    /// Sum a numeric column
    Sum {
        /// Table name
        table: String,

        /// Column path, e.g. 'price' or 'stats.total'
        column: String,
    },

    /// Average a numeric column
    Average {
        /// Table name
        table: String,

        /// Column path, e.g. 'price' or 'stats.total'
        column: String,
    },

    /// List table names
    Tables,

    /// Empty the error table and drop every log entry but the first
    CleanLogs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("pathdb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("pathdb Core v{}", pathdb_core::VERSION);
            Ok(())
        }
        Commands::Table(command) => run(cli.file, cli.no_cache, command),
    }
}

fn run(
    file: Option<PathBuf>,
    no_cache: bool,
    command: TableCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = file.ok_or("Database file required (--file)")?;
    let mut db = Database::open_file(&path)?;
    db.set_no_cache(no_cache);
    tracing::debug!(path = %path.display(), no_cache, "opened database");

    let output = match command {
        TableCommand::Query {
            table,
            expression,
            one,
        } => commands::query::run(&mut db, &table, &expression, one)?,
        TableCommand::Add {
            table,
            record,
            assign_id,
        } => commands::mutate::add(&mut db, &table, &record, assign_id)?,
        TableCommand::Replace {
            table,
            record,
            filter,
        } => commands::mutate::replace(&mut db, &table, &record, filter.as_deref())?,
        TableCommand::Remove { table, expression } => {
            commands::mutate::remove(&mut db, &table, &expression)?
        }
        TableCommand::NextId { table } => commands::stats::next_id(&mut db, &table)?,
        TableCommand::Count { table } => commands::stats::count(&mut db, &table)?,
        TableCommand::Sum { table, column } => commands::stats::sum(&mut db, &table, &column)?,
        TableCommand::Average { table, column } => {
            commands::stats::average(&mut db, &table, &column)?
        }
        TableCommand::Tables => commands::query::tables(&mut db),
        TableCommand::CleanLogs => commands::mutate::clean_logs(&mut db)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(err) = db.last_error() {
        return Err(format!("query failed: {err}").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_is_routed_apart_from_table_commands() {
        let cli = Cli::try_parse_from(["pathdb", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));

        let cli = Cli::try_parse_from(["pathdb", "--file", "db.json", "query", "people"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Table(TableCommand::Query { ref table, ref expression, one: false })
                if table == "people" && expression == "."
        ));
        assert_eq!(cli.file, Some(PathBuf::from("db.json")));

        let cli = Cli::try_parse_from(["pathdb", "clean-logs"]).unwrap();
        assert!(matches!(cli.command, Commands::Table(TableCommand::CleanLogs)));
    }
}
