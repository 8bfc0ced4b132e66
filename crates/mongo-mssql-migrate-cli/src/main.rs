//! mongo-mssql-migrate CLI - one-shot MongoDB to SQL Server migration.

use clap::{Parser, Subcommand};
use mongo_mssql_migrate::{
    health_check, plan_migration, run_migration, Config, MigrateError, MigrationResult,
    MongoSource,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "mongo-mssql-migrate")]
#[command(about = "Migrate MongoDB collections into SQL Server tables")]
#[command(version)]
struct Cli {
    /// Path to YAML (or .json) configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate every configured collection in one transaction
    Run {
        /// Log statements instead of executing them and roll back at the end
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the DDL and index statements that would be issued (source only)
    Plan {
        /// Plan a single collection instead of the configured list
        #[arg(long)]
        collection: Option<String>,
    },

    /// Test database connections
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { dry_run } => {
            if dry_run {
                config.migration.dry_run = true;
            }

            let result = run_migration(config).await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print_summary(&result);
            }
        }

        Commands::Plan { collection } => {
            let source = MongoSource::connect(&config.source).await?;
            let plans = plan_migration(&config, &source, collection.as_deref()).await;
            source.close().await;
            let plans = plans?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                for plan in &plans {
                    println!("-- {} ({} documents)", plan.collection, plan.documents);
                    match (&plan.create_table, &plan.error) {
                        (_, Some(err)) => println!("-- cannot create table: {}", err),
                        (Some(ddl), None) => println!("{};", ddl),
                        (None, None) => println!("-- no fields inferred, table not created"),
                    }
                    for statement in &plan.index_statements {
                        println!("{};", statement);
                    }
                    println!();
                }
            }
        }

        Commands::HealthCheck => {
            let result = health_check(&config).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (MongoDB): {} ({}ms)",
                    if result.source_connected { "OK" } else { "FAILED" },
                    result.source_latency_ms
                );
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Target (SQL Server): {} ({}ms)",
                    if result.target_connected { "OK" } else { "FAILED" },
                    result.target_latency_ms
                );
                if let Some(ref err) = result.target_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.healthy {
                return Err(MigrateError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

fn print_summary(result: &MigrationResult) {
    if result.dry_run {
        println!("\nDry run completed, nothing was written.");
    } else {
        println!("\nData imported successfully!");
    }
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!(
        "  Collections: {} ({} tables created)",
        result.collections_total, result.tables_created
    );
    println!("  Rows: {}", result.rows_inserted);
    println!("  Indexes: {}", result.indexes_created);
    for summary in &result.collections {
        if !summary.skipped_fields.is_empty() {
            println!(
                "  Skipped fields in {}: {:?}",
                summary.collection, summary.skipped_fields
            );
        }
    }
}

/// Logs go to stderr so `--output-json` output stays parseable.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
