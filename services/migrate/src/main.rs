use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use common::{
    database::{DatabaseConfig, connect_with_retry},
    migrations::{MigrationChain, Migrator},
};

/// Apply schema migrations to the slogans database
#[derive(Parser)]
#[command(name = "migrate", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Upgrade {
        /// Stop at this revision instead of the head
        #[arg(long)]
        to: Option<String>,
    },
    /// Revert migrations down to a revision, or `base` for an empty schema
    Downgrade {
        #[arg(long)]
        to: String,
    },
    /// Print the revision recorded in the database
    Current,
    /// List known revisions, root first
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let chain = migrate::chain()?;

    match cli.command.unwrap_or(Command::Upgrade { to: None }) {
        Command::Upgrade { to } => {
            let migrator = connect(chain).await?;
            info!("Running database migrations...");
            let applied = match to {
                Some(target) => migrator.upgrade_to(&target).await?,
                None => migrator.upgrade_to_head().await?,
            };
            info!(
                "Database migrations completed successfully ({} applied)",
                applied.len()
            );
        }
        Command::Downgrade { to } => {
            let migrator = connect(chain).await?;
            let target = (to != "base").then_some(to.as_str());
            let reverted = migrator.downgrade_to(target).await?;
            info!("Reverted {} migration(s)", reverted.len());
        }
        Command::Current => {
            let migrator = connect(chain).await?;
            let current = migrator.current_revision().await?;
            println!("{}", current.as_deref().unwrap_or("base"));
        }
        Command::History => {
            for migration in chain.migrations() {
                println!(
                    "{} -> {}: {}",
                    migration.down_revision.unwrap_or("base"),
                    migration.revision,
                    migration.description
                );
            }
        }
    }

    Ok(())
}

/// Wait for the database, then build a migrator over it
async fn connect(chain: MigrationChain) -> Result<Migrator> {
    info!("Waiting for database to be ready...");
    let db_config = DatabaseConfig::from_env()?;
    let pool = connect_with_retry(&db_config).await?;
    Ok(Migrator::new(pool, chain))
}
