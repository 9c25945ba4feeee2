mod scrape;
mod translate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::scrape::{run_reviews, run_scrape};
use crate::translate::{run_translate, TranslateCommands};

#[derive(Debug, Parser)]
#[command(name = "kurate")]
#[command(about = "Product sourcing and AI curation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one or more marketplace product URLs
    Scrape {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print the scraped results without writing to the database
        #[arg(long)]
        dry_run: bool,

        /// Also queue a pending draft for every stored product
        #[arg(long, conflicts_with = "dry_run")]
        draft: bool,
    },
    /// Collect customer reviews for a product URL
    Reviews {
        url: String,

        /// Print the reviews without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// AI copywriting for product drafts
    Translate {
        #[command(subcommand)]
        command: TranslateCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first so `--help` and usage errors never depend on the environment.
    let cli = Cli::parse();
    let config = kurate_core::load_app_config()?;

    // Logs go to stderr so stdout carries only the JSON summaries.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Scrape {
            urls,
            dry_run,
            draft,
        }) => run_scrape(&config, &urls, dry_run, draft).await?,
        Some(Commands::Reviews { url, dry_run }) => run_reviews(&config, &url, dry_run).await?,
        Some(Commands::Translate { command }) => run_translate(&config, command).await?,
        Some(Commands::Db { command }) => run_db(&config, command).await?,
        None => println!("kurate: pass --help to list commands"),
    }

    Ok(())
}

async fn run_db(config: &kurate_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = kurate_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            kurate_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = kurate_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    pool.close().await;
    Ok(())
}

/// Writes `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
