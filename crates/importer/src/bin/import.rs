use std::path::PathBuf;

use clap::{Parser, Subcommand};
use importer::{DelimitedImporter, ImportContext, ImporterError, SubmissionImporter};
use sqlx::postgres::PgPoolOptions;
use storage::services::leaderboard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "leaderboard-import")]
#[command(about = "Competition leaderboard bulk loader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert one WOD's scores from a delimited file, then rebuild the leaderboard
    BulkUpload {
        /// Competition handle
        #[arg(short, long)]
        competition: String,

        #[arg(long)]
        wod_id: i32,

        #[arg(long, default_value_t = ';')]
        delimiter: char,

        /// Parse and resolve every row without writing
        #[arg(long)]
        validate_only: bool,

        file: PathBuf,
    },
    /// Recompute a competition's leaderboard from its current submissions
    Rebuild {
        #[arg(short, long)]
        competition: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "leaderboard_import={},importer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await?;

    match cli.command {
        Commands::BulkUpload {
            competition,
            wod_id,
            delimiter,
            validate_only,
            file,
        } => {
            let context = ImportContext {
                pool,
                validate_only,
            };
            let importer = DelimitedImporter::new(file, wod_id, delimiter);

            match importer.import(&competition, &context).await {
                Ok(report) => {
                    tracing::info!(
                        "✓ {} row(s) read, {} inserted, {} leaderboard row(s)",
                        report.rows,
                        report.inserted,
                        report.leaderboard_rows
                    );
                }
                Err(ImporterError::ValidationError(errors)) => {
                    for error in &errors {
                        tracing::error!("  {}", error);
                    }
                    return Err(format!("{} row(s) rejected, nothing imported", errors.len()).into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Rebuild { competition } => {
            let rows = leaderboard::rebuild(&pool, &competition).await?;
            tracing::info!("✓ Leaderboard of '{}' rebuilt with {} row(s)", competition, rows);
        }
    }

    Ok(())
}
