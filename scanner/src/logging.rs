// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::cli::Cli;
use crate::error::LoggingError;

/// Keeps the file writers flushing until dropped at the end of `main`.
#[must_use]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Install the tracing subscriber.
///
/// Console output always goes to stderr. With `--log-to-file`, daily rolling
/// text and JSON logs are written to `--log-dir` as well. `RUST_LOG` overrides
/// `--log-level`.
pub fn init_logging(args: &Cli) -> Result<LogGuards, LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("sweep_relay={}", args.log_level))?,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());

    let registry = tracing_subscriber::registry().with(console_layer);

    if !args.log_to_file {
        registry.try_init()?;
        tracing::info!("Logging initialized with level: {}", args.log_level);
        return Ok(LogGuards { _guards: Vec::new() });
    }

    std::fs::create_dir_all(&args.log_dir).map_err(|source| LoggingError::LogDir {
        path: args.log_dir.clone(),
        source,
    })?;

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(daily(&args.log_dir, "sweep-relay.log"));
    let (json_writer, json_guard) =
        tracing_appender::non_blocking(daily(&args.log_dir, "sweep-relay.json"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(file_writer)
        .with_filter(env_filter.clone());

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(json_writer)
        .with_filter(env_filter);

    registry.with(file_layer).with(json_layer).try_init()?;

    tracing::info!("Logging initialized with level: {}", args.log_level);
    tracing::info!("Log files will be written to: {}", args.log_dir);

    Ok(LogGuards {
        _guards: vec![file_guard, json_guard],
    })
}
