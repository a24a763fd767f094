use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_kernel::settings::Settings;

/// Manage and run the bookshelf service
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    /// Directory holding base.toml and <env>.toml
    #[arg(long, global = true, env = "BOOKSHELF_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load (local, staging, production)
    #[arg(long = "env", global = true, env = "BOOKSHELF_ENV", default_value = "local")]
    environment: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database tables and exit
    InitDb,
    /// Print the effective settings as JSON
    ShowConfig,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let config_dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Settings::load_from(&config_dir, &self.environment)
            .with_context(|| format!("failed to load settings from {}", config_dir.display()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Allow missing `.env` files without failing.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::InitDb => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let (pool, registry) = bookshelf_app::prepare_database(&settings).await?;
            tracing::info!(
                tables = registry.collect_schema().len(),
                db = %settings.database.url,
                "database initialized"
            );
            pool.close().await;
        }
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::run(settings).await?;
        }
    }

    Ok(())
}
