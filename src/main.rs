use std::path::Path;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tpulm::cli::{self, Cli, Commands};
use tpulm::config::Settings;
use tpulm::environment::{declare_runtime, EnvironmentAccess, ProcessEnvironment};

/// Main entry point for tpulm
///
/// Loads settings, initializes logging, declares the PJRT runtime once for the
/// whole process, then runs the requested command.
///
/// # Errors
/// Returns an error if settings are invalid, or if the model cannot be read or
/// placed on the resolved device
fn main() -> Result<()> {
    let cli_args = Cli::parse();

    // Load settings first
    let settings = Settings::from_dir(&cli_args.config_dir)?;

    let log_dir = settings.logging.file.as_deref().unwrap_or_else(|| Path::new("logs"));
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        log_dir,
        "tpulm",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.to_lowercase()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                // Disable ANSI colors for cleaner log files
                .with_ansi(false)
                .with_line_number(true)
                .with_file(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    info!("tpulm starting up...");
    info!("Log directory: {}", std::fs::canonicalize(log_dir)?.display());
    info!("Models directory: {}", settings.models.directory.display());

    let env: Arc<dyn EnvironmentAccess> = Arc::new(ProcessEnvironment::new());
    let runtime = declare_runtime(env.as_ref());
    info!("PJRT runtime: {}", runtime);

    match cli_args.command {
        Commands::Load { model, task, batch_size, sequence_length, args } => {
            cli::load(&settings, env, &model, task, batch_size, sequence_length, args)?;
        }
        Commands::Inspect { model } => {
            cli::inspect(&settings, env, &model)?;
        }
    }

    Ok(())
}
