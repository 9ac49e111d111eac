//! Logging Infrastructure
//!
//! Structured logging for applications embedding the order client:
//! console output (plain or JSON) plus an optional daily rotating file.

use crate::{ClientError, ClientResult};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber
///
/// # Arguments
/// * `level` - Default filter when `RUST_LOG` is unset (e.g., "info", "order_client=debug")
/// * `json_format` - Emit JSON lines instead of human-readable output
/// * `log_dir` - Also write `client.YYYY-MM-DD` files under this directory
///
/// Keep the returned guard alive for as long as file logging should flush.
///
/// # Examples
/// ```no_run
/// let _guard = order_client::logging::init_logger("debug", false, None)?;
/// # Ok::<(), order_client::ClientError>(())
/// ```
pub fn init_logger(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> ClientResult<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "client");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ClientError::Config(format!("logger already initialized: {}", e)))?;

    Ok(guard)
}
