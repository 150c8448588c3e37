//! Logging setup
//!
//! Console output through `tracing-subscriber`, plus an optional rolling JSON
//! file written through a non-blocking `tracing-appender` worker.

use crate::config::{LogRotation, LoggingConfig};
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "kubewarm.log";

/// Build the level filter: `RUST_LOG` if set, else the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer when dropped and must be held
/// until the process exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let console_layer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(io::stdout)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_writer(io::stdout)
            .boxed()
    };

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let file_appender = match config.rotation {
                LogRotation::Hourly => rolling::hourly(dir, LOG_FILE_PREFIX),
                LogRotation::Daily => rolling::daily(dir, LOG_FILE_PREFIX),
                LogRotation::Never => rolling::never(dir, LOG_FILE_PREFIX),
            };
            let (writer, guard) = non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");

    Ok(guard)
}
