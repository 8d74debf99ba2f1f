use clap::{Parser, Subcommand};
use cms_backend::config::Config;
use cms_backend::logging;
use cms_backend::migrations::{init_auto_migrations, MigrationStore, SqliteBackend};
use cms_backend::models::default_models;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "cms-migrate")]
#[command(about = "Schema migrations for the CMS backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// SQLite database file (overrides config and CMS_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate every content model not yet recorded
    Migrate {
        /// Log progress for every model
        #[arg(long, conflicts_with = "quiet")]
        verbose: bool,
        /// Only log failures and the summary
        #[arg(long)]
        quiet: bool,
    },
    /// List recorded migrations
    Status {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the content models and their migration ids
    Models,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    match cli.command {
        Commands::Migrate { verbose, quiet } => {
            let _guard = logging::init_logging(&config.logging)?;
            let verbose = if verbose {
                true
            } else if quiet {
                false
            } else {
                config.migrations.verbose
            };

            let backend = SqliteBackend::open(&config.database.path)?;
            match init_auto_migrations(&backend, verbose) {
                Ok(report) => {
                    info!(
                        applied = report.applied.len(),
                        skipped = report.skipped.len(),
                        "Migrations finished"
                    );
                    println!("✅ Migrations complete: {} applied, {} already up to date", report.applied.len(), report.skipped.len());
                    for id in &report.applied {
                        println!("   + {}", id);
                    }
                }
                Err(e) => {
                    println!("❌ Migration failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Status { json } => {
            let backend = SqliteBackend::open(&config.database.path)?;
            if !backend.table_exists(cms_backend::constants::MIGRATION_RECORDS_TABLE)? {
                println!("No migrations have been run against {}", config.database.path.display());
                return Ok(());
            }
            let records = backend.list_records()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("📋 {} recorded migrations:", records.len());
                for record in &records {
                    println!("   {}  {}", record.created_at.to_rfc3339(), record.id);
                }
            }
        }
        Commands::Models => {
            for model in default_models() {
                println!("{:<10} {:<20} {}", model.name, model.migration_id(), model.table);
            }
        }
    }
    Ok(())
}
