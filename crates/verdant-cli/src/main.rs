#![forbid(unsafe_code)]

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use verdant_core::ExitCode;

#[derive(Parser)]
#[command(name = "verdant")]
#[command(about = "Verdant emissions-tracking operations CLI")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its schema.
    Init {
        #[arg(long)]
        db: PathBuf,
    },
    /// Normalize a saved workflow response and persist it as a record.
    Import {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        response: PathBuf,
        #[arg(long)]
        source_file: String,
        #[arg(long)]
        reporting_period: Option<String>,
    },
    /// List a user's emissions records.
    Records {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        user: String,
    },
    /// Totals, yearly aggregation, and active-scenario progress.
    Summary {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        user: String,
    },
}

fn main() -> ProcessExitCode {
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            eprintln!("{err}");
            ProcessExitCode::from(ExitCode::Internal as u8)
        }
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init { db } => commands::init(&db),
        Commands::Import {
            db,
            user,
            response,
            source_file,
            reporting_period,
        } => commands::import(&db, &user, &response, &source_file, reporting_period, cli.json),
        Commands::Records { db, user } => commands::records(&db, &user, cli.json),
        Commands::Summary { db, user } => commands::summary(&db, &user, cli.json),
    }
}
