use crate::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Routes `tracing` output to a daily rolling file under `config.directory`.
///
/// Stdout belongs to the TUI, so nothing is printed to the terminal.
/// `RUST_LOG` overrides the configured level. Keep the returned guard alive
/// for the lifetime of the process or buffered lines are lost.
pub fn initialize_logging(config: &LoggingConfig) -> WorkerGuard {
    let _ = std::fs::create_dir_all(&config.directory);

    let file_appender = tracing_appender::rolling::daily(&config.directory, "blue-steps.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!(directory = %config.directory, "Logging initialized");
    guard
}
