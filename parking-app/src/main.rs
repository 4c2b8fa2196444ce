//! # Parking Application
//!
//! Binary that wires together all the components:
//! - Load configuration from the command line and environment
//! - Initialize the repository adapter
//! - Create the ticket service
//! - Run one command and print its result as JSON

mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use parking_hex::{TicketService, inbound};
use parking_repo::build_repo;

use config::{Cli, LogFormat};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,parking_hex=debug,parking_app=debug".into());

    // stdout carries command output only
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<Result<serde_json::Value, inbound::CommandError>> {
    let config = cli.parking_config();
    tracing::debug!(
        hourly_rate = %config.hourly_rate,
        daily_rate = %config.daily_rate,
        max_capacity = config.max_capacity,
        "loaded configuration"
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&cli.database_url).await?;

    let service = match TicketService::new(repo, config) {
        Ok(service) => service,
        Err(e) => return Ok(Err(e.into())),
    };

    Ok(inbound::execute(&service, cli.command.into()).await)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await? {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("{}", serde_json::to_string_pretty(&err.to_json())?);
            Ok(ExitCode::from(err.exit_code() as u8))
        }
    }
}
