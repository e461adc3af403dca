//! `vtu` - VTU and SMS verification CLI.

use anyhow::Context;
use clap::Parser;
use sms_order::OrderError;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vtu_cli::{App, AppError, Cli, Config, LogFormat};

/// 128 + SIGINT, as shells report an interrupted command.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log.level, config.log.format);

    debug!("API endpoint: {}", config.api.base_url);

    let app = App::new(&config, cli.json).context("Failed to create API client")?;

    let shutdown = app.shutdown.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping...");
            shutdown.cancel();
        }
        // A second interrupt skips the grace period.
        if signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    match app.run(&cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(AppError::Interrupted) | Err(AppError::Order(OrderError::Cancelled)) => {
            std::process::exit(INTERRUPTED_EXIT_CODE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Logs go to stderr so command output on stdout stays pipeable.
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

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
