//! Device inventory CLI
//!
//! Administration and inspection of the device inventory from the shell.
//! Results are printed as JSON on stdout; logs go to stderr.

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use inv_core::{AppConfig, InvError, LogFormat, LoggingConfig};
use inv_db::{Database, DeviceFilter, DeviceRepository, Repository, RepositoryError};
use inv_models::{DevicePatch, NewDevice};

mod args;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env().map_err(InvError::from)?;
    init_tracing(&config.logging);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting inventory");

    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let result = run(cli.command, &db, &config).await;
    db.close().await;
    result
}

/// Initialize tracing/logging
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(command: Commands, db: &Database, config: &AppConfig) -> anyhow::Result<()> {
    let repo = DeviceRepository::new(db.pool().clone()).with_limits(config.pagination);

    match command {
        Commands::List(args) => {
            let filter = DeviceFilter::from(args);
            let page = repo.list(&filter).await.map_err(classify)?;
            print_json(&page)
        }
        Commands::Get { id } => {
            let device = repo.get(id).await.map_err(classify)?;
            print_json(&device)
        }
        Commands::Create(args) => {
            let device = repo.create(NewDevice::from(args)).await.map_err(classify)?;
            info!(id = %device.id, "Device created");
            print_json(&device)
        }
        Commands::Replace { id, device } => {
            let device = repo.replace(id, NewDevice::from(device)).await.map_err(classify)?;
            print_json(&device)
        }
        Commands::Patch { id, patch } => {
            let patch = DevicePatch::from(patch);
            if patch.is_empty() {
                bail!("Nothing to change: pass --name, --brand or --state");
            }
            let device = repo.update(id, patch).await.map_err(classify)?;
            print_json(&device)
        }
        Commands::Delete { id } => {
            repo.delete(id).await.map_err(classify)?;
            info!(id = %id, "Device deleted");
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Commands::InitSchema => {
            db.ensure_schema().await?;
            print_json(&serde_json::json!({ "schema": "ready" }))
        }
    }
}

/// Fold into the service error so failures carry their classification
fn classify(err: RepositoryError) -> anyhow::Error {
    let err = InvError::from(err);
    let code = err.error_code();
    if !err.is_client_error() {
        error!(code, error = %err, "Operation failed");
    }
    anyhow::Error::new(err).context(code)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
